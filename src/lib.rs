// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `LifeCore` Lib - Device lifecycle core for cloud connected IoT devices.
//!
//! This library keeps the per-device state a connected device needs between
//! its cloud transport and its application: the most recent cloud
//! connectivity status, the authentication token expiry, and the
//! firmware-over-the-air (FOTA) update lifecycle. It validates every change
//! and notifies the application through two registered handlers.
//!
//! # Supported Features
//!
//! - **Cloud status**: Registration, login, logout, token refresh and failure
//!   notifications with a registration context and user data
//! - **Firmware updates**: Command confirmation, monotonic stage tracking,
//!   results and firmware descriptors
//! - **Persistence**: JSON snapshots of the firmware update state
//! - **Event loop**: Triggers posted from any thread, delayed triggers and
//!   graceful shutdown on tokio (feature `event-loop`, enabled by default)
//!
//! # Quick Start
//!
//! ## Direct Use
//!
//! ```
//! use lifecore_lib::Device;
//! use lifecore_lib::fota::FotaSignal;
//! use lifecore_lib::types::{FirmwareDescriptor, FotaCommand, FotaResult, FotaState};
//!
//! let mut device = Device::new(0);
//!
//! // Confirm every command except applying an update
//! device.register_fota_cmd_handler(|cmd| cmd != FotaCommand::ApplyUpdate);
//!
//! let firmware = FirmwareDescriptor::new("1.2.0", "coap://fw.example/1.2.0.bin")?;
//! let outcome = device
//!     .fota()
//!     .submit(FotaCommand::StartDownload, Some(firmware))?;
//! assert!(outcome.is_accepted());
//! assert_eq!(device.fota_state(), FotaState::Downloading);
//!
//! device.fota().complete(FotaSignal::DownloadComplete)?;
//! assert_eq!(device.fota_result(), Some(FotaResult::Success));
//! # Ok::<(), lifecore_lib::Error>(())
//! ```
//!
//! ## Cloud Manager on the Event Loop
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use lifecore_lib::cloud::{CloudConfig, CloudEvent};
//! use lifecore_lib::{Device, EventLoop};
//!
//! #[tokio::main]
//! async fn main() -> lifecore_lib::Result<()> {
//!     let mut device = Device::new(0);
//!     let mut cloud = device.cloud();
//!     cloud.provision(CloudConfig::new("coaps://cloud.example:5684", "auth"))?;
//!     cloud.start(|_ctx, status, _data| println!("cloud status: {status}"), None);
//!
//!     let event_loop = EventLoop::new(device);
//!     let handle = event_loop.handle();
//!     let task = event_loop.spawn();
//!
//!     // Called from the transport's callbacks
//!     handle.post_cloud_event(CloudEvent::Connected);
//!     handle.schedule_cloud_event(CloudEvent::SessionStarted, Duration::from_secs(1));
//!
//!     handle.shutdown();
//!     let _device = task.await.expect("event loop panicked");
//!     Ok(())
//! }
//! ```
//!
//! # Error Codes
//!
//! Every [`Error`] maps to a numeric code with [`Error::code`]: invalid
//! values, malformed input and bad configuration give `-22`, rejected
//! transitions give `-1`, and a command during a running update gives `-16`.

pub mod cloud;
mod device;
pub mod error;
pub mod fota;
#[cfg(feature = "event-loop")]
mod runtime;
pub mod state;
pub mod subscription;
pub mod types;

pub use device::{Device, DeviceHandle, SharedDevice};
pub use error::{ConfigError, Error, ParseError, Result, TransitionError, ValueError};
#[cfg(feature = "event-loop")]
pub use runtime::EventLoop;
pub use subscription::{CallbackRegistry, UserData};
