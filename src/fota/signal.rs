// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Completion signals and command outcomes.

use std::fmt;

use crate::types::{FotaResult, FotaState};

/// Why an in-progress update was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// The firmware image could not be retrieved.
    DownloadFailed,
    /// The retrieved image failed verification.
    InvalidImage,
    /// Installing the image failed.
    InstallFailed,
    /// The connection to the firmware source was lost.
    ConnectionLost,
}

impl From<AbortReason> for FotaResult {
    fn from(reason: AbortReason) -> Self {
        match reason {
            AbortReason::DownloadFailed => Self::DownloadFailed,
            AbortReason::InvalidImage => Self::InvalidImage,
            AbortReason::InstallFailed => Self::InstallFailed,
            AbortReason::ConnectionLost => Self::ConnectionLost,
        }
    }
}

/// Completion signal from the component doing the actual transfer or install.
///
/// # Examples
///
/// ```
/// use lifecore_lib::fota::{AbortReason, FotaSignal};
/// use lifecore_lib::types::FotaState;
///
/// assert_eq!(FotaSignal::DownloadComplete.completes(), Some(FotaState::Downloading));
/// assert_eq!(FotaSignal::Abort(AbortReason::ConnectionLost).completes(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FotaSignal {
    /// The update check finished.
    CheckComplete,
    /// The firmware image was retrieved.
    DownloadComplete,
    /// The firmware image was installed.
    InstallComplete,
    /// The running stage failed.
    Abort(AbortReason),
}

impl FotaSignal {
    /// Returns the stage this signal completes successfully.
    ///
    /// [`FotaSignal::Abort`] applies to any in-progress stage and returns
    /// `None`.
    #[must_use]
    pub const fn completes(&self) -> Option<FotaState> {
        match self {
            Self::CheckComplete => Some(FotaState::Checking),
            Self::DownloadComplete => Some(FotaState::Downloading),
            Self::InstallComplete => Some(FotaState::Installing),
            Self::Abort(_) => None,
        }
    }
}

impl fmt::Display for FotaSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckComplete => f.write_str("check_complete"),
            Self::DownloadComplete => f.write_str("download_complete"),
            Self::InstallComplete => f.write_str("install_complete"),
            Self::Abort(reason) => write!(f, "abort({})", FotaResult::from(*reason)),
        }
    }
}

/// Outcome of a firmware command that was not rejected with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FotaOutcome {
    /// The handler confirmed the command; the cycle is now in `state`.
    Accepted {
        /// The stage entered.
        state: FotaState,
    },
    /// The handler declined the command, or no handler is registered.
    Declined,
}

impl FotaOutcome {
    /// Returns `true` if the command was confirmed.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}
