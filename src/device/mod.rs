// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device lifecycle context.
//!
//! A [`Device`] owns everything the lifecycle core knows about one device:
//! the status store, the callback registry, the cloud session and the queue
//! of pending triggers. Work arrives in two ways:
//!
//! - **Directly**, through `&mut Device` setters or the borrowed
//!   [`CloudManager`] and [`FotaCoordinator`] views. Handlers run
//!   synchronously before the call returns.
//! - **Posted**, through a [`DeviceHandle`] from any thread. Posted triggers
//!   are handled on the next [`Device::poll`], usually driven by an
//!   [`EventLoop`](crate::EventLoop).
//!
//! ```
//! use lifecore_lib::Device;
//! use lifecore_lib::types::{CloudFlag, CloudStatus, FotaResult, FotaState};
//!
//! let mut device = Device::new(0);
//! device.register_status_handler(
//!     |_ctx, status, _data| println!("cloud status: {status}"),
//!     None,
//! );
//!
//! device.set_status(CloudStatus::from(CloudFlag::LoggedIn), None)?;
//! device.set_fota_state(FotaState::Downloading)?;
//! device.set_fota_state(FotaState::Failed)?;
//! device.set_fota_result(FotaResult::DownloadFailed)?;
//!
//! assert_eq!(device.fota_result(), Some(FotaResult::DownloadFailed));
//! # Ok::<(), lifecore_lib::Error>(())
//! ```

mod handle;
mod inbox;
mod shared;

pub use handle::DeviceHandle;
pub use shared::SharedDevice;

pub(crate) use inbox::Inbox;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::cloud::{CloudContext, CloudEvent, CloudManager, CloudSession};
use crate::error::Result;
use crate::fota::FotaCoordinator;
use crate::state::{FotaSnapshot, StatusStore};
use crate::subscription::{CallbackRegistry, UserData};
use crate::types::{CloudStatus, FirmwareDescriptor, FotaCommand, FotaResult, FotaState};

use inbox::Trigger;

/// Lifecycle context of one device.
///
/// Created in the default state: no cloud status, unknown token expiry,
/// idle firmware update with no result or descriptor, no handlers.
#[derive(Debug)]
pub struct Device {
    index: usize,
    store: StatusStore,
    callbacks: CallbackRegistry,
    session: CloudSession,
    inbox: Inbox,
    handle: DeviceHandle,
}

impl Device {
    /// Creates the context for the device with the given index.
    #[must_use]
    pub fn new(index: usize) -> Self {
        let (inbox, tx) = Inbox::new();
        tracing::debug!(device = index, "Device context created");
        Self {
            index,
            store: StatusStore::new(),
            callbacks: CallbackRegistry::new(),
            session: CloudSession::default(),
            inbox,
            handle: DeviceHandle::new(tx),
        }
    }

    /// Returns the device index.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns a handle for posting triggers from other threads.
    #[must_use]
    pub fn handle(&self) -> DeviceHandle {
        self.handle.clone()
    }

    /// Returns the cloud manager view of this device.
    pub fn cloud(&mut self) -> CloudManager<'_> {
        CloudManager::new(
            self.index,
            &mut self.session,
            &mut self.store,
            &mut self.callbacks,
            &mut self.inbox,
        )
    }

    /// Returns the firmware update coordinator view of this device.
    pub fn fota(&mut self) -> FotaCoordinator<'_> {
        FotaCoordinator::new(&mut self.store, &self.callbacks)
    }

    // Callback registration

    /// Registers the cloud status handler, replacing any previous one.
    pub fn register_status_handler<F>(&mut self, callback: F, user_data: Option<UserData>)
    where
        F: Fn(Option<&CloudContext>, CloudStatus, Option<&UserData>) + Send + Sync + 'static,
    {
        self.callbacks.register_status_handler(callback, user_data);
    }

    /// Removes the cloud status handler. Does nothing if none is registered.
    pub fn unregister_status_handler(&mut self) {
        self.callbacks.unregister_status_handler();
    }

    /// Registers the firmware command confirmation handler, replacing any
    /// previous one.
    ///
    /// Returns `true` when the handler is registered, which is always the
    /// case.
    pub fn register_fota_cmd_handler<F>(&mut self, callback: F) -> bool
    where
        F: Fn(FotaCommand) -> bool + Send + Sync + 'static,
    {
        self.callbacks.register_fota_cmd_handler(callback)
    }

    /// Removes the firmware command handler. Does nothing if none is
    /// registered.
    pub fn unregister_fota_cmd_handler(&mut self) {
        self.callbacks.unregister_fota_cmd_handler();
    }

    // Setters

    /// Records a cloud status and notifies the status handler.
    ///
    /// When `status` contains `token_expiring`, `expiry` is required and is
    /// recorded as the new token expiry; otherwise it is ignored. The handler
    /// receives no registration context. An empty status is recorded
    /// without notification.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::MissingTokenExpiry`](crate::ValueError) when the
    /// expiry is required but absent; nothing changes in that case.
    pub fn set_status(&mut self, status: CloudStatus, expiry: Option<u32>) -> Result<()> {
        self.store.set_status(status, expiry)?;
        if !status.is_empty() {
            self.callbacks.dispatch_status(None, status);
        }
        Ok(())
    }

    /// Sets the firmware update stage.
    ///
    /// Returning to [`FotaState::Idle`] clears the result and descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transition`](crate::Error::Transition) for a backward
    /// or terminal-to-terminal move.
    pub fn set_fota_state(&mut self, state: FotaState) -> Result<()> {
        Ok(self.store.set_fota_state(state)?)
    }

    /// Records the firmware version and download location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`](crate::Error::Value) if either is empty.
    pub fn set_fw_info(&mut self, version: &str, uri: &str) -> Result<()> {
        Ok(self.store.set_fw_info(version, uri)?)
    }

    /// Records the firmware update result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transition`](crate::Error::Transition) unless the
    /// stage is terminal and no result was recorded in this cycle.
    pub fn set_fota_result(&mut self, result: FotaResult) -> Result<()> {
        Ok(self.store.set_fota_result(result)?)
    }

    /// Restores a persisted firmware update snapshot.
    ///
    /// A snapshot taken while waiting for confirmation restores as idle,
    /// since the confirmation handler never answered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transition`](crate::Error::Transition) for an
    /// inconsistent snapshot.
    pub fn restore_fota(&mut self, snapshot: FotaSnapshot) -> Result<()> {
        Ok(self.store.restore_fota(snapshot)?)
    }

    // Getters

    /// Returns the flags of the most recent cloud status.
    #[must_use]
    pub fn cloud_status(&self) -> CloudStatus {
        self.store.cloud_status()
    }

    /// Returns the last recorded token expiry in seconds.
    #[must_use]
    pub fn token_expiry(&self) -> Option<u32> {
        self.store.token_expiry()
    }

    /// Returns the firmware update stage.
    #[must_use]
    pub fn fota_state(&self) -> FotaState {
        self.store.fota_state()
    }

    /// Returns the firmware update result of the current cycle.
    #[must_use]
    pub fn fota_result(&self) -> Option<FotaResult> {
        self.store.fota_result()
    }

    /// Returns the recorded firmware descriptor.
    #[must_use]
    pub fn firmware(&self) -> Option<&FirmwareDescriptor> {
        self.store.firmware()
    }

    /// Returns the firmware update state as one snapshot.
    #[must_use]
    pub fn fota_snapshot(&self) -> FotaSnapshot {
        self.store.fota_snapshot()
    }

    /// Subscribes to firmware update snapshots.
    ///
    /// The receiver sees every accepted change, including the pending
    /// confirmation stage while the command handler runs.
    #[must_use]
    pub fn subscribe_fota(&self) -> watch::Receiver<FotaSnapshot> {
        self.store.subscribe_fota()
    }

    // Processing

    /// Schedules a cloud trigger for the first step at or after `at`.
    pub fn schedule_cloud_event(&mut self, event: CloudEvent, at: Instant) {
        self.inbox.schedule(at, Trigger::Cloud(event));
    }

    /// Returns `true` if posted or scheduled triggers are waiting.
    #[must_use]
    pub fn has_pending(&mut self) -> bool {
        self.inbox.len() > 0
    }

    /// Handles every trigger due at `now` and returns the next deadline.
    ///
    /// Firmware triggers are handled in arrival order. Cloud triggers are
    /// then delivered to the status handler as one notification. Failures of
    /// posted triggers are logged, since no caller waits for them.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        let device = self.index;
        let triggers = self.inbox.drain(now);
        if !triggers.is_empty() {
            tracing::trace!(device, count = triggers.len(), "Handling triggers");
        }

        let mut cloud_events = Vec::new();
        for trigger in triggers {
            match trigger {
                Trigger::Cloud(event) => cloud_events.push(event),
                Trigger::FotaCommand { command, firmware } => {
                    if let Err(e) = self.fota().submit(command, firmware) {
                        tracing::warn!(
                            device,
                            %command,
                            error = %e,
                            "Posted firmware command rejected"
                        );
                    }
                }
                Trigger::FotaSignal(signal) => {
                    if let Err(e) = self.fota().complete(signal) {
                        tracing::warn!(
                            device,
                            %signal,
                            error = %e,
                            "Posted firmware signal rejected"
                        );
                    }
                }
            }
        }

        if let Err(e) = self.cloud().handle_batch(cloud_events) {
            tracing::warn!(device, error = %e, "Posted cloud triggers rejected");
        }

        self.inbox.next_deadline()
    }

    /// Tears the context down and returns the final firmware update state.
    ///
    /// Both handlers are dropped along with any pending triggers.
    pub fn shutdown(mut self) -> FotaSnapshot {
        self.callbacks.clear();
        let snapshot = self.store.fota_snapshot();
        tracing::debug!(device = self.index, state = %snapshot.state, "Device context shut down");
        snapshot
    }
}
