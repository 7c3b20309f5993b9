// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only view of the firmware update lifecycle.

use crate::error::ParseError;
use crate::types::{FirmwareDescriptor, FotaResult, FotaState};

/// Snapshot of the firmware update state, result and descriptor.
///
/// Snapshots are what observers read and what a device persists across
/// restarts.
///
/// # Examples
///
/// ```
/// use lifecore_lib::state::FotaSnapshot;
/// use lifecore_lib::types::FotaState;
///
/// let snapshot = FotaSnapshot::default();
/// assert_eq!(snapshot.state, FotaState::Idle);
/// assert!(snapshot.result.is_none());
/// assert!(snapshot.firmware.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct FotaSnapshot {
    /// Current lifecycle stage.
    pub state: FotaState,
    /// Result of the cycle, present only once a terminal stage is reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<FotaResult>,
    /// Firmware handled by the cycle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<FirmwareDescriptor>,
}

impl FotaSnapshot {
    /// Serializes the snapshot to JSON for persistence.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ParseError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a snapshot previously produced by [`FotaSnapshot::to_json`].
    ///
    /// The snapshot is only parsed here; consistency is checked when it is
    /// restored into a store.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if the text is not a valid snapshot.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }
}
