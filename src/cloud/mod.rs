// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud registration and connectivity status.
//!
//! The cloud transport reports lifecycle triggers as [`CloudEvent`] values.
//! The [`CloudManager`] turns each trigger into a status flag, records it
//! and notifies the application's cloud status handler with a
//! [`CloudContext`].
//!
//! # Trigger mapping
//!
//! | Trigger                          | Flag              |
//! |----------------------------------|-------------------|
//! | [`CloudEvent::Connected`]        | `registered`      |
//! | [`CloudEvent::TokenRefreshDue`]  | `token_expiring`  |
//! | [`CloudEvent::Failure`]          | `failed`          |
//! | [`CloudEvent::SessionStarted`]   | `logged_in`       |
//! | [`CloudEvent::SessionEnded`]     | `logged_out`      |
//! | [`CloudEvent::Deregistered`]     | `deregistered`    |
//! | [`CloudEvent::TokenRotated`]     | `token_refreshed` |

mod config;
mod event;
mod manager;

pub use config::CloudConfig;
pub use event::{CloudContext, CloudEvent};
pub use manager::CloudManager;

pub(crate) use manager::CloudSession;
