// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud provisioning configuration.

use uuid::Uuid;

use crate::error::{ConfigError, ParseError};

/// URI schemes accepted for the cloud interface server.
const SUPPORTED_SCHEMES: [&str; 4] = ["coap://", "coaps://", "coap+tcp://", "coaps+tcp://"];

/// Provisioning record describing which cloud a device registers with.
///
/// # Examples
///
/// ```
/// use lifecore_lib::cloud::CloudConfig;
/// use uuid::Uuid;
///
/// let config = CloudConfig::new("coap+tcp://127.0.0.1:5683", "test")
///     .with_sid(Uuid::from_u128(1))
///     .with_apn("test");
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.sid().to_string(), "00000000-0000-0000-0000-000000000001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct CloudConfig {
    /// Cloud interface server URI.
    server_uri: String,
    /// One-time authorization code used for registration.
    auth_code: String,
    /// Identifier of the cloud server.
    sid: Uuid,
    /// Authorization provider name.
    apn: String,
}

impl CloudConfig {
    /// Creates a configuration for the given server and authorization code.
    ///
    /// The server identifier defaults to the nil UUID and the authorization
    /// provider to `"default"`.
    #[must_use]
    pub fn new(server_uri: impl Into<String>, auth_code: impl Into<String>) -> Self {
        Self {
            server_uri: server_uri.into(),
            auth_code: auth_code.into(),
            sid: Uuid::nil(),
            apn: "default".to_string(),
        }
    }

    /// Sets the cloud server identifier.
    #[must_use]
    pub fn with_sid(mut self, sid: Uuid) -> Self {
        self.sid = sid;
        self
    }

    /// Sets the authorization provider name.
    #[must_use]
    pub fn with_apn(mut self, apn: impl Into<String>) -> Self {
        self.apn = apn.into();
        self
    }

    /// Returns the cloud interface server URI.
    #[must_use]
    pub fn server_uri(&self) -> &str {
        &self.server_uri
    }

    /// Returns the authorization code.
    #[must_use]
    pub fn auth_code(&self) -> &str {
        &self.auth_code
    }

    /// Returns the cloud server identifier.
    #[must_use]
    pub fn sid(&self) -> Uuid {
        self.sid
    }

    /// Returns the authorization provider name.
    #[must_use]
    pub fn apn(&self) -> &str {
        &self.apn
    }

    /// Checks that every field is usable for registration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyField`] for an empty field and
    /// [`ConfigError::InvalidServerUri`] if the server URI does not use a
    /// CoAP scheme.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server_uri.is_empty() {
            return Err(ConfigError::EmptyField("server_uri"));
        }
        let has_scheme = SUPPORTED_SCHEMES.iter().any(|scheme| {
            self.server_uri.starts_with(scheme) && self.server_uri.len() > scheme.len()
        });
        if !has_scheme {
            return Err(ConfigError::InvalidServerUri(self.server_uri.clone()));
        }
        if self.auth_code.is_empty() {
            return Err(ConfigError::EmptyField("auth_code"));
        }
        if self.apn.is_empty() {
            return Err(ConfigError::EmptyField("apn"));
        }
        Ok(())
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if the text is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(json)?)
    }
}
