// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Async event loop driving one device.
//!
//! The loop polls the device whenever a trigger is posted through a
//! [`DeviceHandle`], whenever a scheduled trigger falls due, and when woken
//! explicitly. It exits after [`DeviceHandle::shutdown`].
//!
//! ```
//! use std::time::Duration;
//!
//! use lifecore_lib::cloud::CloudEvent;
//! use lifecore_lib::types::CloudFlag;
//! use lifecore_lib::{Device, EventLoop};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let event_loop = EventLoop::new(Device::new(0));
//! let handle = event_loop.handle();
//! let task = tokio::spawn(event_loop.run());
//!
//! handle.post_cloud_event(CloudEvent::Connected);
//! tokio::time::sleep(Duration::from_millis(10)).await;
//! handle.shutdown();
//!
//! let device = task.await.unwrap();
//! assert!(device.lock().cloud_status().contains(CloudFlag::Registered));
//! # }
//! ```

use std::future::pending;

use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::device::{DeviceHandle, SharedDevice};

/// Runs a device's processing steps on the tokio runtime.
#[derive(Debug)]
pub struct EventLoop {
    device: SharedDevice,
    handle: DeviceHandle,
}

impl EventLoop {
    /// Creates a loop for the given device.
    #[must_use]
    pub fn new(device: impl Into<SharedDevice>) -> Self {
        let device = device.into();
        let handle = device.handle();
        Self { device, handle }
    }

    /// Returns the shared device the loop drives.
    ///
    /// Lock it only briefly while the loop runs.
    #[must_use]
    pub fn device(&self) -> SharedDevice {
        self.device.clone()
    }

    /// Returns a posting handle for the device.
    #[must_use]
    pub fn handle(&self) -> DeviceHandle {
        self.handle.clone()
    }

    /// Spawns the loop on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<SharedDevice> {
        tokio::spawn(self.run())
    }

    /// Runs until shutdown is requested and returns the device.
    ///
    /// Triggers posted before shutdown are handled first if the loop sees
    /// them in the same step; later ones stay queued in the device.
    pub async fn run(self) -> SharedDevice {
        let Self { device, handle } = self;
        let mut shutdown = handle.shutdown_receiver();
        let index = device.lock().index();
        tracing::info!(device = index, "Event loop started");

        while !*shutdown.borrow_and_update() {
            let next = device.lock().poll(Instant::now());

            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                () = handle.notified() => {
                    tracing::trace!(device = index, "Event loop woken");
                }
                () = sleep_or_pending(next) => {
                    tracing::trace!(device = index, "Scheduled trigger due");
                }
            }
        }

        tracing::info!(device = index, "Event loop stopped");
        device
    }
}

async fn sleep_or_pending(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => pending().await,
    }
}
