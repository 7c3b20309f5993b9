// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud lifecycle triggers and registration context.

use std::fmt;

use crate::types::CloudFlag;

/// Network lifecycle trigger reported by the cloud transport.
///
/// Every trigger raises exactly one [`CloudFlag`].
///
/// # Examples
///
/// ```
/// use lifecore_lib::cloud::CloudEvent;
/// use lifecore_lib::types::CloudFlag;
///
/// let event = CloudEvent::TokenRefreshDue { expires_in: 3600 };
/// assert_eq!(event.flag(), CloudFlag::TokenExpiring);
/// assert_eq!(event.expiry(), Some(3600));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudEvent {
    /// Registration with the cloud succeeded.
    Connected,
    /// The access token needs refreshing.
    TokenRefreshDue {
        /// Seconds until the token expires.
        expires_in: u32,
    },
    /// A connectivity failure occurred.
    Failure,
    /// A cloud session was established.
    SessionStarted,
    /// The cloud session ended.
    SessionEnded,
    /// The device was deregistered.
    Deregistered,
    /// The access token was rotated.
    TokenRotated,
}

impl CloudEvent {
    /// Returns the status flag this trigger raises.
    #[must_use]
    pub const fn flag(&self) -> CloudFlag {
        match self {
            Self::Connected => CloudFlag::Registered,
            Self::TokenRefreshDue { .. } => CloudFlag::TokenExpiring,
            Self::Failure => CloudFlag::Failed,
            Self::SessionStarted => CloudFlag::LoggedIn,
            Self::SessionEnded => CloudFlag::LoggedOut,
            Self::Deregistered => CloudFlag::Deregistered,
            Self::TokenRotated => CloudFlag::TokenRefreshed,
        }
    }

    /// Returns the token expiry carried by the trigger.
    #[must_use]
    pub const fn expiry(&self) -> Option<u32> {
        match self {
            Self::TokenRefreshDue { expires_in } => Some(*expires_in),
            _ => None,
        }
    }
}

impl fmt::Display for CloudEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::TokenRefreshDue { expires_in } => write!(f, "token_refresh_due({expires_in}s)"),
            Self::Failure => f.write_str("failure"),
            Self::SessionStarted => f.write_str("session_started"),
            Self::SessionEnded => f.write_str("session_ended"),
            Self::Deregistered => f.write_str("deregistered"),
            Self::TokenRotated => f.write_str("token_rotated"),
        }
    }
}

/// Registration context handed to the cloud status handler.
///
/// It identifies the device instance the notification is about and carries
/// the values a handler usually wants to print, so the handler never needs
/// to call back into the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudContext {
    device: usize,
    token_expiry: Option<u32>,
    running: bool,
}

impl CloudContext {
    pub(crate) fn new(device: usize, token_expiry: Option<u32>, running: bool) -> Self {
        Self {
            device,
            token_expiry,
            running,
        }
    }

    /// Returns the index of the device instance.
    #[must_use]
    pub fn device(&self) -> usize {
        self.device
    }

    /// Returns the last recorded token expiry in seconds.
    #[must_use]
    pub fn token_expiry(&self) -> Option<u32> {
        self.token_expiry
    }

    /// Returns `true` if the cloud manager was started and not stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}
