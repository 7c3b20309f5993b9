// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware update lifecycle enumerations.
//!
//! Each update cycle starts in [`FotaState::Idle`], passes through one or more
//! in-progress stages and ends in a terminal stage carrying a [`FotaResult`].
//! [`FotaCommand`] values are the directives a cloud or management layer
//! sends to start or cancel a cycle.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Stage of the firmware update lifecycle.
///
/// Stages are ordered: within one cycle the state only moves forward.
/// Going back requires a reset to [`FotaState::Idle`], which starts a new
/// cycle.
///
/// # Examples
///
/// ```
/// use lifecore_lib::types::FotaState;
///
/// assert!(FotaState::Idle.is_idle());
/// assert!(FotaState::Downloading.is_in_progress());
/// assert!(FotaState::Failed.is_terminal());
/// assert!(FotaState::Installing.rank() > FotaState::Downloading.rank());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FotaState {
    /// No update cycle is running.
    #[default]
    Idle,
    /// A command is waiting for the confirmation handler.
    PendingConfirmation,
    /// Checking whether a new firmware is available.
    Checking,
    /// Firmware image is being downloaded.
    Downloading,
    /// Firmware image is being installed.
    Installing,
    /// The cycle completed successfully.
    Succeeded,
    /// The cycle ended with a failure.
    Failed,
}

impl FotaState {
    /// All stages in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Idle,
        Self::PendingConfirmation,
        Self::Checking,
        Self::Downloading,
        Self::Installing,
        Self::Succeeded,
        Self::Failed,
    ];

    /// Returns the snake-case name of the stage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PendingConfirmation => "pending_confirmation",
            Self::Checking => "checking",
            Self::Downloading => "downloading",
            Self::Installing => "installing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Position of the stage within a cycle.
    ///
    /// Both terminal stages share the highest rank.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::PendingConfirmation => 1,
            Self::Checking => 2,
            Self::Downloading => 3,
            Self::Installing => 4,
            Self::Succeeded | Self::Failed => 5,
        }
    }

    /// Returns `true` for the idle stage.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Returns `true` for stages between idle and terminal.
    #[must_use]
    pub const fn is_in_progress(&self) -> bool {
        !self.is_idle() && !self.is_terminal()
    }

    /// Returns `true` for the success and failure stages.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for FotaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FotaState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownValue {
                kind: "fota state",
                value: s.to_string(),
            })
    }
}

/// Outcome of a finished update cycle.
///
/// # Examples
///
/// ```
/// use lifecore_lib::types::{FotaResult, FotaState};
///
/// assert!(FotaResult::Success.is_success());
/// assert_eq!(FotaResult::InstallFailed.terminal_state(), FotaState::Failed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FotaResult {
    /// The cycle completed.
    Success,
    /// The firmware image could not be retrieved.
    DownloadFailed,
    /// The retrieved image failed verification.
    InvalidImage,
    /// Installing the image failed.
    InstallFailed,
    /// The connection to the firmware source was lost.
    ConnectionLost,
    /// The cycle was cancelled by a command.
    Cancelled,
}

impl FotaResult {
    /// All results.
    pub const ALL: [Self; 6] = [
        Self::Success,
        Self::DownloadFailed,
        Self::InvalidImage,
        Self::InstallFailed,
        Self::ConnectionLost,
        Self::Cancelled,
    ];

    /// Returns the snake-case name of the result.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::DownloadFailed => "download_failed",
            Self::InvalidImage => "invalid_image",
            Self::InstallFailed => "install_failed",
            Self::ConnectionLost => "connection_lost",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for [`FotaResult::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the terminal stage this result belongs to.
    #[must_use]
    pub const fn terminal_state(&self) -> FotaState {
        if self.is_success() {
            FotaState::Succeeded
        } else {
            FotaState::Failed
        }
    }
}

impl fmt::Display for FotaResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FotaResult {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|result| result.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownValue {
                kind: "fota result",
                value: s.to_string(),
            })
    }
}

/// Directive presented to the confirmation handler.
///
/// Commands are never persisted; only their effect on state and result is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FotaCommand {
    /// Ask the firmware source whether an update exists.
    CheckForUpdate,
    /// Retrieve a firmware image.
    StartDownload,
    /// Install a firmware image.
    ApplyUpdate,
    /// Abandon the running cycle.
    Cancel,
}

impl FotaCommand {
    /// All commands.
    pub const ALL: [Self; 4] = [
        Self::CheckForUpdate,
        Self::StartDownload,
        Self::ApplyUpdate,
        Self::Cancel,
    ];

    /// Returns the snake-case name of the command.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CheckForUpdate => "check_for_update",
            Self::StartDownload => "start_download",
            Self::ApplyUpdate => "apply_update",
            Self::Cancel => "cancel",
        }
    }

    /// Returns the in-progress stage entered once the command is confirmed.
    ///
    /// [`FotaCommand::Cancel`] starts no stage and returns `None`.
    #[must_use]
    pub const fn target_state(&self) -> Option<FotaState> {
        match self {
            Self::CheckForUpdate => Some(FotaState::Checking),
            Self::StartDownload => Some(FotaState::Downloading),
            Self::ApplyUpdate => Some(FotaState::Installing),
            Self::Cancel => None,
        }
    }
}

impl fmt::Display for FotaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FotaCommand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownValue {
                kind: "fota command",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_categories() {
        assert!(FotaState::Idle.is_idle());
        assert!(!FotaState::Idle.is_in_progress());

        for state in [
            FotaState::PendingConfirmation,
            FotaState::Checking,
            FotaState::Downloading,
            FotaState::Installing,
        ] {
            assert!(state.is_in_progress(), "{state} should be in progress");
            assert!(!state.is_terminal());
        }

        assert!(FotaState::Succeeded.is_terminal());
        assert!(FotaState::Failed.is_terminal());
    }

    #[test]
    fn ranks_follow_lifecycle_order() {
        let ranks: Vec<u8> = FotaState::ALL.iter().map(FotaState::rank).collect();
        assert_eq!(ranks, vec![0, 1, 2, 3, 4, 5, 5]);
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(FotaState::default(), FotaState::Idle);
    }

    #[test]
    fn state_from_str() {
        assert_eq!(
            "pending_confirmation".parse::<FotaState>().unwrap(),
            FotaState::PendingConfirmation
        );
        assert!("rebooting".parse::<FotaState>().is_err());
    }

    #[test]
    fn result_terminal_state() {
        assert_eq!(FotaResult::Success.terminal_state(), FotaState::Succeeded);
        for result in &FotaResult::ALL[1..] {
            assert_eq!(result.terminal_state(), FotaState::Failed);
        }
    }

    #[test]
    fn command_targets() {
        assert_eq!(
            FotaCommand::StartDownload.target_state(),
            Some(FotaState::Downloading)
        );
        assert_eq!(
            FotaCommand::ApplyUpdate.target_state(),
            Some(FotaState::Installing)
        );
        assert_eq!(FotaCommand::Cancel.target_state(), None);
    }

    #[test]
    fn command_from_str() {
        assert_eq!(
            "START_DOWNLOAD".parse::<FotaCommand>().unwrap(),
            FotaCommand::StartDownload
        );
        let err = "reboot".parse::<FotaCommand>().unwrap_err();
        assert_eq!(err.to_string(), "unknown fota command: reboot");
    }
}
