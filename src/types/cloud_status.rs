// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud connectivity status flags.
//!
//! A cloud notification reports one or more independent facts at once, for
//! example a device that just logged in and whose token is already close
//! to expiry. [`CloudStatus`] is a fixed-size set of [`CloudFlag`] values
//! describing what changed in one notification.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// One independent fact about cloud connectivity.
///
/// # Examples
///
/// ```
/// use lifecore_lib::types::CloudFlag;
///
/// assert_eq!(CloudFlag::TokenExpiring.as_str(), "token_expiring");
/// assert_eq!("logged_in".parse::<CloudFlag>().unwrap(), CloudFlag::LoggedIn);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudFlag {
    /// The device registered with the cloud.
    Registered,
    /// The access token is about to expire.
    TokenExpiring,
    /// A connectivity or protocol failure occurred.
    Failed,
    /// A cloud session was established.
    LoggedIn,
    /// The cloud session ended.
    LoggedOut,
    /// The device was deregistered.
    Deregistered,
    /// The access token was rotated.
    TokenRefreshed,
}

impl CloudFlag {
    /// Number of distinct flags.
    pub const COUNT: usize = 7;

    /// All flags in reporting order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Registered,
        Self::TokenExpiring,
        Self::Failed,
        Self::LoggedIn,
        Self::LoggedOut,
        Self::Deregistered,
        Self::TokenRefreshed,
    ];

    /// Returns the snake-case name of the flag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Registered => "registered",
            Self::TokenExpiring => "token_expiring",
            Self::Failed => "failed",
            Self::LoggedIn => "logged_in",
            Self::LoggedOut => "logged_out",
            Self::Deregistered => "deregistered",
            Self::TokenRefreshed => "token_refreshed",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Registered => 0,
            Self::TokenExpiring => 1,
            Self::Failed => 2,
            Self::LoggedIn => 3,
            Self::LoggedOut => 4,
            Self::Deregistered => 5,
            Self::TokenRefreshed => 6,
        }
    }
}

impl fmt::Display for CloudFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudFlag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flag| flag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseError::UnknownValue {
                kind: "cloud flag",
                value: s.to_string(),
            })
    }
}

/// Set of cloud status flags raised by one notification.
///
/// Flags are signals, not levels: a flag present in a notification says the
/// corresponding event happened since the previous notification. Nothing
/// clears them implicitly.
///
/// # Examples
///
/// ```
/// use lifecore_lib::types::{CloudFlag, CloudStatus};
///
/// let status = CloudStatus::from(CloudFlag::LoggedIn).with(CloudFlag::TokenExpiring);
/// assert!(status.contains(CloudFlag::LoggedIn));
/// assert!(status.is_token_expiring());
/// assert_eq!(status.len(), 2);
/// assert_eq!(status.to_string(), "token_expiring|logged_in");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(from = "Vec<CloudFlag>", into = "Vec<CloudFlag>")]
pub struct CloudStatus {
    flags: [bool; CloudFlag::COUNT],
}

impl CloudStatus {
    /// Creates an empty status.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            flags: [false; CloudFlag::COUNT],
        }
    }

    /// Returns this status with `flag` added.
    #[must_use]
    pub const fn with(mut self, flag: CloudFlag) -> Self {
        self.flags[flag.slot()] = true;
        self
    }

    /// Adds a flag to the set.
    pub fn insert(&mut self, flag: CloudFlag) {
        self.flags[flag.slot()] = true;
    }

    /// Removes a flag from the set.
    pub fn remove(&mut self, flag: CloudFlag) {
        self.flags[flag.slot()] = false;
    }

    /// Adds every flag of `other` to the set.
    pub fn extend_from(&mut self, other: Self) {
        for flag in other.iter() {
            self.insert(flag);
        }
    }

    /// Returns `true` if the flag is present.
    #[must_use]
    pub const fn contains(&self, flag: CloudFlag) -> bool {
        self.flags[flag.slot()]
    }

    /// Returns `true` if the token-expiring flag is present.
    #[must_use]
    pub const fn is_token_expiring(&self) -> bool {
        self.contains(CloudFlag::TokenExpiring)
    }

    /// Returns `true` if no flag is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.flags.iter().any(|set| *set)
    }

    /// Returns the number of flags present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.iter().filter(|set| **set).count()
    }

    /// Iterates over the flags present, in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = CloudFlag> + '_ {
        CloudFlag::ALL
            .into_iter()
            .filter(move |flag| self.contains(*flag))
    }
}

impl From<CloudFlag> for CloudStatus {
    fn from(flag: CloudFlag) -> Self {
        Self::empty().with(flag)
    }
}

impl FromIterator<CloudFlag> for CloudStatus {
    fn from_iter<I: IntoIterator<Item = CloudFlag>>(iter: I) -> Self {
        let mut status = Self::empty();
        for flag in iter {
            status.insert(flag);
        }
        status
    }
}

impl From<Vec<CloudFlag>> for CloudStatus {
    fn from(flags: Vec<CloudFlag>) -> Self {
        flags.into_iter().collect()
    }
}

impl From<CloudStatus> for Vec<CloudFlag> {
    fn from(status: CloudStatus) -> Self {
        status.iter().collect()
    }
}

impl fmt::Debug for CloudStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for CloudStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (i, flag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(flag.as_str())?;
        }
        Ok(())
    }
}
