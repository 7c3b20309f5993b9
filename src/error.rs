// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `lifecore` library.
//!
//! Failures are grouped by what the caller can do about them: malformed
//! arguments ([`ValueError`]), transitions the lifecycle does not allow
//! ([`TransitionError`]), a busy update cycle ([`Error::Busy`]), and
//! parsing or configuration problems. None of them is fatal; every failing
//! operation leaves the previous state intact.
//!
//! A confirmation handler declining a command is *not* an error; see
//! [`FotaOutcome::Declined`](crate::fota::FotaOutcome::Declined).

use thiserror::Error;

use crate::fota::FotaSignal;
use crate::types::{FotaResult, FotaState};

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument was malformed.
    #[error("invalid argument: {0}")]
    Value(#[from] ValueError),

    /// The requested transition is not allowed from the current state.
    #[error("invalid transition: {0}")]
    Transition(#[from] TransitionError),

    /// A firmware update cycle is already in progress.
    ///
    /// Callers may retry once the current cycle has reached a terminal
    /// stage and been reset.
    #[error("firmware update busy in state {state}")]
    Busy {
        /// The stage the in-flight cycle is in.
        state: FotaState,
    },

    /// Error occurred while parsing a value or a persisted record.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Cloud configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Return code for invalid arguments, parse and configuration errors.
    pub const CODE_INVALID_ARGUMENT: i32 = -22;
    /// Return code for transitions the lifecycle does not allow.
    pub const CODE_INVALID_TRANSITION: i32 = -1;
    /// Return code for a command rejected because a cycle is in flight.
    pub const CODE_BUSY: i32 = -16;

    /// Returns the negative return code a platform layer reports for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use lifecore_lib::{Error, ValueError};
    ///
    /// let err: Error = ValueError::EmptyVersion.into();
    /// assert_eq!(err.code(), Error::CODE_INVALID_ARGUMENT);
    /// ```
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Value(_) | Self::Parse(_) | Self::Config(_) => Self::CODE_INVALID_ARGUMENT,
            Self::Transition(_) => Self::CODE_INVALID_TRANSITION,
            Self::Busy { .. } => Self::CODE_BUSY,
        }
    }

    /// Returns `true` if this is a busy condition worth retrying later.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

/// Errors related to malformed arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A firmware descriptor was given an empty version.
    #[error("firmware version must not be empty")]
    EmptyVersion,

    /// A firmware descriptor was given an empty URI.
    #[error("firmware URI must not be empty")]
    EmptyUri,

    /// The token-expiring flag was raised without an expiry value.
    #[error("token expiring status requires an expiry value")]
    MissingTokenExpiry,
}

/// Errors related to lifecycle transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A terminal stage cannot move to another terminal stage without a reset.
    #[error("cannot move from terminal {from} to terminal {to} without a reset")]
    TerminalToTerminal {
        /// The current terminal stage.
        from: FotaState,
        /// The requested terminal stage.
        to: FotaState,
    },

    /// The state may only move backward through a reset to idle.
    #[error("cannot move backward from {from} to {to}")]
    Backward {
        /// The current stage.
        from: FotaState,
        /// The requested stage.
        to: FotaState,
    },

    /// A result was set while the cycle had not reached a terminal stage.
    #[error("cannot record a result while in non-terminal state {state}")]
    ResultWhileNonTerminal {
        /// The current stage.
        state: FotaState,
    },

    /// The cycle already carries a result.
    #[error("result already recorded for this cycle: {result}")]
    ResultAlreadySet {
        /// The result already stored.
        result: FotaResult,
    },

    /// The result does not belong to the terminal stage it was set in.
    #[error("result {result} does not match terminal state {state}")]
    ResultMismatch {
        /// The current terminal stage.
        state: FotaState,
        /// The rejected result.
        result: FotaResult,
    },

    /// A terminal stage was restored without its result.
    #[error("terminal state {state} has no result")]
    MissingResult {
        /// The terminal stage.
        state: FotaState,
    },

    /// A completion signal does not apply to the current stage.
    #[error("signal {signal} does not apply in state {state}")]
    UnexpectedSignal {
        /// The signal that was received.
        signal: FotaSignal,
        /// The current stage.
        state: FotaState,
    },

    /// A cancel command arrived with no update in progress.
    #[error("nothing to cancel in state {state}")]
    NothingToCancel {
        /// The current stage.
        state: FotaState,
    },

    /// A reset was requested while an update is still in progress.
    #[error("cannot reset while update is in progress ({state})")]
    ResetWhileInProgress {
        /// The current stage.
        state: FotaState,
    },
}

/// Errors related to parsing names and persisted records.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A name did not match any known value.
    #[error("unknown {kind}: {value}")]
    UnknownValue {
        /// The kind of value being parsed.
        kind: &'static str,
        /// The text that failed to parse.
        value: String,
    },
}

/// Errors related to cloud provisioning configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field is empty.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// The cloud server URI does not use a supported scheme.
    #[error("unsupported cloud server URI: {0}")]
    InvalidServerUri(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
