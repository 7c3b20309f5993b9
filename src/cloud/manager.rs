// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloud registration state machine.

use crate::device::Inbox;
use crate::error::Result;
use crate::state::StatusStore;
use crate::subscription::{CallbackRegistry, UserData};
use crate::types::{CloudFlag, CloudStatus};

use super::{CloudConfig, CloudContext, CloudEvent};

/// Per-device cloud registration data kept between processing steps.
#[derive(Debug, Default)]
pub(crate) struct CloudSession {
    /// Provisioned cloud configuration.
    pub config: Option<CloudConfig>,
    /// Whether the manager was started and not stopped.
    pub running: bool,
}

/// Drives a device's cloud registration status.
///
/// The manager is a short-lived view over the device, obtained from
/// [`Device::cloud`](crate::Device::cloud). Each lifecycle trigger records
/// its flag in the status store and invokes the cloud status handler
/// synchronously with the flag set, the registration context and the
/// handler's user data.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// use lifecore_lib::Device;
/// use lifecore_lib::cloud::{CloudConfig, CloudEvent};
///
/// let mut device = Device::new(0);
/// let notifications = Arc::new(AtomicU32::new(0));
/// let counter = notifications.clone();
///
/// let mut cloud = device.cloud();
/// cloud.start(
///     move |_ctx, _status, _data| {
///         counter.fetch_add(1, Ordering::SeqCst);
///     },
///     None,
/// );
/// cloud.provision(CloudConfig::new("coap+tcp://127.0.0.1:5683", "test"))?;
/// cloud.handle(CloudEvent::Connected)?;
/// cloud.handle(CloudEvent::SessionStarted)?;
///
/// assert_eq!(notifications.load(Ordering::SeqCst), 2);
/// # Ok::<(), lifecore_lib::Error>(())
/// ```
#[derive(Debug)]
pub struct CloudManager<'a> {
    device: usize,
    session: &'a mut CloudSession,
    store: &'a mut StatusStore,
    callbacks: &'a mut CallbackRegistry,
    inbox: &'a mut Inbox,
}

impl<'a> CloudManager<'a> {
    pub(crate) fn new(
        device: usize,
        session: &'a mut CloudSession,
        store: &'a mut StatusStore,
        callbacks: &'a mut CallbackRegistry,
        inbox: &'a mut Inbox,
    ) -> Self {
        Self {
            device,
            session,
            store,
            callbacks,
            inbox,
        }
    }

    /// Starts the manager with the given cloud status handler.
    ///
    /// The handler replaces any status handler already registered.
    pub fn start<F>(&mut self, callback: F, user_data: Option<UserData>)
    where
        F: Fn(Option<&CloudContext>, CloudStatus, Option<&UserData>) + Send + Sync + 'static,
    {
        self.callbacks.register_status_handler(callback, user_data);
        self.session.running = true;
        tracing::info!(device = self.device, "Cloud manager started");
    }

    /// Stops the manager.
    ///
    /// Unregisters the status handler and drops cloud triggers scheduled for
    /// later. Recorded status and token expiry are kept.
    pub fn stop(&mut self) {
        self.callbacks.unregister_status_handler();
        let dropped = self.inbox.cancel_cloud_events();
        self.session.running = false;
        tracing::info!(device = self.device, dropped, "Cloud manager stopped");
    }

    /// Stores the cloud provisioning configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// is invalid; the previous configuration is kept.
    pub fn provision(&mut self, config: CloudConfig) -> Result<()> {
        config.validate()?;
        tracing::info!(
            device = self.device,
            server = config.server_uri(),
            sid = %config.sid(),
            "Cloud configuration provisioned"
        );
        self.session.config = Some(config);
        Ok(())
    }

    /// Returns the provisioned configuration.
    #[must_use]
    pub fn config(&self) -> Option<&CloudConfig> {
        self.session.config.as_ref()
    }

    /// Returns `true` if the manager was started and not stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.session.running
    }

    /// Returns the registration context passed to the status handler.
    #[must_use]
    pub fn context(&self) -> CloudContext {
        CloudContext::new(self.device, self.store.token_expiry(), self.session.running)
    }

    /// Applies one lifecycle trigger and notifies the status handler.
    ///
    /// # Errors
    ///
    /// Propagates a store validation failure; the built-in triggers always
    /// carry what the store requires.
    pub fn handle(&mut self, event: CloudEvent) -> Result<CloudStatus> {
        self.handle_batch([event])
    }

    /// Applies several triggers as one notification.
    ///
    /// The handler is invoked once with the union of the raised flags. If
    /// several token refreshes are in the batch, the last expiry wins. An
    /// empty batch records and dispatches nothing.
    ///
    /// # Errors
    ///
    /// Propagates a store validation failure; nothing is recorded or
    /// dispatched in that case.
    pub fn handle_batch<I>(&mut self, events: I) -> Result<CloudStatus>
    where
        I: IntoIterator<Item = CloudEvent>,
    {
        let mut status = CloudStatus::empty();
        let mut expiry = None;
        for event in events {
            tracing::debug!(device = self.device, event = %event, "Cloud trigger");
            status.insert(event.flag());
            if let Some(seconds) = event.expiry() {
                expiry = Some(seconds);
            }
        }
        if status.is_empty() {
            return Ok(status);
        }

        self.store.set_status(status, expiry)?;
        if status.contains(CloudFlag::Failed) {
            tracing::warn!(device = self.device, %status, "Cloud failure reported");
        }

        let context = self.context();
        self.callbacks.dispatch_status(Some(&context), status);
        Ok(status)
    }
}
