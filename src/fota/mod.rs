// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware-over-the-air update coordination.
//!
//! The [`FotaCoordinator`] receives firmware commands, asks the application's
//! confirmation handler, and records state, firmware descriptor and result
//! in the device's status store. Completion of the actual transfer or
//! install is reported back with a [`FotaSignal`].

mod coordinator;
mod signal;

pub use coordinator::FotaCoordinator;
pub use signal::{AbortReason, FotaOutcome, FotaSignal};
