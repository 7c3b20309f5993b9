// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware descriptor type.

use std::fmt;

use crate::error::ValueError;

/// Version and retrieval URI of the firmware handled by an update cycle.
///
/// Both fields are always populated; a descriptor with an empty version or
/// an empty URI cannot be constructed.
///
/// # Examples
///
/// ```
/// use lifecore_lib::types::FirmwareDescriptor;
///
/// let fw = FirmwareDescriptor::new("1.2.0", "https://fw/1.2.0.bin").unwrap();
/// assert_eq!(fw.version(), "1.2.0");
/// assert_eq!(fw.uri(), "https://fw/1.2.0.bin");
///
/// assert!(FirmwareDescriptor::new("", "https://fw/1.2.0.bin").is_err());
/// assert!(FirmwareDescriptor::new("1.2.0", "").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct FirmwareDescriptor {
    version: String,
    uri: String,
}

impl FirmwareDescriptor {
    /// Creates a descriptor from a version and a URI.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::EmptyVersion`] or [`ValueError::EmptyUri`] if
    /// either field is empty.
    pub fn new(version: impl Into<String>, uri: impl Into<String>) -> Result<Self, ValueError> {
        let version = version.into();
        let uri = uri.into();
        if version.trim().is_empty() {
            return Err(ValueError::EmptyVersion);
        }
        if uri.trim().is_empty() {
            return Err(ValueError::EmptyUri);
        }
        Ok(Self { version, uri })
    }

    /// Returns the firmware version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the firmware retrieval URI.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl fmt::Display for FirmwareDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.uri)
    }
}

#[derive(serde::Deserialize)]
struct RawDescriptor {
    version: String,
    uri: String,
}

impl TryFrom<RawDescriptor> for FirmwareDescriptor {
    type Error = ValueError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        Self::new(raw.version, raw.uri)
    }
}
