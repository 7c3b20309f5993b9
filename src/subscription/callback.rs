// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single-slot handler registry.
//!
//! - [`CallbackRegistry`] - Holds at most one handler of each kind
//! - [`UserData`] - Opaque value bound to the cloud status handler

use std::any::Any;
use std::sync::Arc;

use crate::cloud::CloudContext;
use crate::types::{CloudStatus, FotaCommand};

/// Opaque value handed back to the cloud status handler on every call.
///
/// The registry only keeps a reference; the caller that registered it keeps
/// ownership of whatever it points to.
pub type UserData = Arc<dyn Any + Send + Sync>;

/// Type alias for the cloud status handler.
type StatusCallback =
    Arc<dyn Fn(Option<&CloudContext>, CloudStatus, Option<&UserData>) + Send + Sync>;

/// Type alias for the firmware command confirmation handler.
type FotaCmdCallback = Arc<dyn Fn(FotaCommand) -> bool + Send + Sync>;

/// Registered status handler together with its user data.
struct StatusSlot {
    callback: StatusCallback,
    user_data: Option<UserData>,
}

/// Registry holding at most one firmware command handler and at most one
/// cloud status handler.
///
/// Registration is last-writer-wins: registering a handler replaces the
/// previous one of the same kind. Unregistering clears the slot and is
/// valid even if it is already empty.
///
/// Handlers run synchronously on the thread driving the device and must
/// return quickly.
///
/// # Examples
///
/// ```
/// use lifecore_lib::subscription::CallbackRegistry;
/// use lifecore_lib::types::FotaCommand;
///
/// let mut registry = CallbackRegistry::new();
/// assert_eq!(registry.confirm(FotaCommand::StartDownload), None);
///
/// registry.register_fota_cmd_handler(|cmd| cmd != FotaCommand::ApplyUpdate);
/// assert_eq!(registry.confirm(FotaCommand::StartDownload), Some(true));
/// assert_eq!(registry.confirm(FotaCommand::ApplyUpdate), Some(false));
///
/// registry.unregister_fota_cmd_handler();
/// registry.unregister_fota_cmd_handler();
/// assert_eq!(registry.confirm(FotaCommand::StartDownload), None);
/// ```
#[derive(Default)]
pub struct CallbackRegistry {
    fota_cmd: Option<FotaCmdCallback>,
    status: Option<StatusSlot>,
}

impl CallbackRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Firmware command handler
    // =========================================================================

    /// Registers the firmware command confirmation handler.
    ///
    /// Replaces any handler already registered and always returns `true`.
    pub fn register_fota_cmd_handler<F>(&mut self, callback: F) -> bool
    where
        F: Fn(FotaCommand) -> bool + Send + Sync + 'static,
    {
        if self.fota_cmd.is_some() {
            tracing::debug!("Replacing FOTA command handler");
        }
        self.fota_cmd = Some(Arc::new(callback));
        true
    }

    /// Clears the firmware command handler slot.
    pub fn unregister_fota_cmd_handler(&mut self) {
        self.fota_cmd = None;
    }

    /// Returns `true` if a firmware command handler is registered.
    #[must_use]
    pub fn has_fota_cmd_handler(&self) -> bool {
        self.fota_cmd.is_some()
    }

    /// Asks the firmware command handler to confirm `command`.
    ///
    /// Returns `None` when no handler is registered.
    pub fn confirm(&self, command: FotaCommand) -> Option<bool> {
        self.fota_cmd.as_ref().map(|callback| callback(command))
    }

    // =========================================================================
    // Cloud status handler
    // =========================================================================

    /// Registers the cloud status handler and the user data passed back to it.
    ///
    /// Replaces any handler already registered, together with its user data.
    pub fn register_status_handler<F>(&mut self, callback: F, user_data: Option<UserData>)
    where
        F: Fn(Option<&CloudContext>, CloudStatus, Option<&UserData>) + Send + Sync + 'static,
    {
        if self.status.is_some() {
            tracing::debug!("Replacing cloud status handler");
        }
        self.status = Some(StatusSlot {
            callback: Arc::new(callback),
            user_data,
        });
    }

    /// Clears the cloud status handler slot.
    pub fn unregister_status_handler(&mut self) {
        self.status = None;
    }

    /// Returns `true` if a cloud status handler is registered.
    #[must_use]
    pub fn has_status_handler(&self) -> bool {
        self.status.is_some()
    }

    /// Invokes the cloud status handler, if any.
    ///
    /// Returns `true` if a handler was invoked.
    pub fn dispatch_status(&self, context: Option<&CloudContext>, status: CloudStatus) -> bool {
        let Some(slot) = &self.status else {
            return false;
        };
        tracing::trace!(%status, "Dispatching cloud status");
        (slot.callback)(context, status, slot.user_data.as_ref());
        true
    }

    /// Clears both handler slots.
    pub fn clear(&mut self) {
        self.fota_cmd = None;
        self.status = None;
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("fota_cmd_handler", &self.has_fota_cmd_handler())
            .field("status_handler", &self.has_status_handler())
            .finish()
    }
}
