// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device status storage.
//!
//! The [`StatusStore`] holds the most recent cloud notification, the last
//! known token expiry and the firmware update lifecycle. [`FotaSnapshot`] is
//! the read-only, persistable view of the firmware update part.
//!
//! # Examples
//!
//! ```
//! use lifecore_lib::state::StatusStore;
//! use lifecore_lib::types::{CloudFlag, CloudStatus};
//!
//! let mut store = StatusStore::new();
//! store
//!     .set_status(CloudStatus::from(CloudFlag::TokenExpiring), Some(3600))
//!     .unwrap();
//!
//! assert_eq!(store.token_expiry(), Some(3600));
//! ```

mod fota_snapshot;
mod status_store;

pub use fota_snapshot::FotaSnapshot;
pub use status_store::StatusStore;
