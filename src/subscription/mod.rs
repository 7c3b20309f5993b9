// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Application handlers for cloud status and firmware commands.
//!
//! A device consults exactly two application handlers:
//!
//! - the **cloud status handler**, told about every cloud connectivity
//!   notification together with the registration context and an opaque
//!   [`UserData`] value;
//! - the **firmware command handler**, asked to confirm or decline every
//!   firmware update command.
//!
//! Each has a single slot in the [`CallbackRegistry`]. Registering again
//! replaces the previous handler; there is never more than one subscriber.
//!
//! # Usage
//!
//! ```
//! use lifecore_lib::Device;
//! use lifecore_lib::types::FotaCommand;
//!
//! let mut device = Device::new(0);
//!
//! device.register_status_handler(
//!     |_ctx, status, _data| println!("cloud status: {status}"),
//!     None,
//! );
//! device.register_fota_cmd_handler(|cmd| cmd != FotaCommand::ApplyUpdate);
//!
//! // Later
//! device.unregister_fota_cmd_handler();
//! ```

mod callback;

pub use callback::{CallbackRegistry, UserData};
