// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for cloud status and firmware updates.
//!
//! Every type validates at construction or parsing time, so a value held by
//! the library is always well formed.
//!
//! # Types
//!
//! - [`CloudFlag`] - One cloud connectivity condition
//! - [`CloudStatus`] - Set of cloud flags raised by one notification
//! - [`FotaState`] - Firmware update stage
//! - [`FotaResult`] - Outcome of a finished firmware update
//! - [`FotaCommand`] - Firmware update command to confirm
//! - [`FirmwareDescriptor`] - Firmware version and download location

mod cloud_status;
mod firmware;
mod fota;

pub use cloud_status::{CloudFlag, CloudStatus};
pub use firmware::FirmwareDescriptor;
pub use fota::{FotaCommand, FotaResult, FotaState};
