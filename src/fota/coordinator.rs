// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Firmware update cycle coordination.

use crate::error::{Error, Result, TransitionError};
use crate::state::{FotaSnapshot, StatusStore};
use crate::subscription::CallbackRegistry;
use crate::types::{FirmwareDescriptor, FotaCommand, FotaResult, FotaState};

use super::{FotaOutcome, FotaSignal};

/// Drives one device's firmware update cycles.
///
/// The coordinator is a short-lived view over the device's store and
/// handler registry, obtained from [`Device::fota`](crate::Device::fota).
/// Every firmware-related write made through it goes through command or
/// signal handling, so state, descriptor and result stay consistent.
///
/// # Cycle
///
/// ```text
/// idle --command--> pending_confirmation --confirmed--> checking | downloading | installing
///   ^                        |                                   |
///   |                     declined                       complete / abort / cancel
///   |                        v                                   v
///   +--------------------- idle        reset <------- succeeded | failed
/// ```
///
/// # Examples
///
/// ```
/// use lifecore_lib::Device;
/// use lifecore_lib::fota::{FotaOutcome, FotaSignal};
/// use lifecore_lib::types::{FirmwareDescriptor, FotaCommand, FotaResult, FotaState};
///
/// let mut device = Device::new(0);
/// device.register_fota_cmd_handler(|_| true);
///
/// let fw = FirmwareDescriptor::new("1.2.0", "https://fw/1.2.0.bin")?;
/// let outcome = device.fota().submit(FotaCommand::StartDownload, Some(fw))?;
/// assert_eq!(outcome, FotaOutcome::Accepted { state: FotaState::Downloading });
///
/// device.fota().complete(FotaSignal::DownloadComplete)?;
/// assert_eq!(device.fota_result(), Some(FotaResult::Success));
///
/// device.fota().reset()?;
/// assert_eq!(device.fota_state(), FotaState::Idle);
/// # Ok::<(), lifecore_lib::Error>(())
/// ```
#[derive(Debug)]
pub struct FotaCoordinator<'a> {
    store: &'a mut StatusStore,
    callbacks: &'a CallbackRegistry,
}

impl<'a> FotaCoordinator<'a> {
    pub(crate) fn new(store: &'a mut StatusStore, callbacks: &'a CallbackRegistry) -> Self {
        Self { store, callbacks }
    }

    /// Handles a firmware command from the cloud or management layer.
    ///
    /// Commands that start a cycle are only accepted while idle. The state
    /// moves to [`FotaState::PendingConfirmation`] while the confirmation
    /// handler runs. If it confirms, the cycle enters the command's stage
    /// and `firmware` is recorded; if it declines, or no handler is
    /// registered, the state returns to idle and stored data is left as it
    /// was before the command.
    ///
    /// [`FotaCommand::Cancel`] is handled by [`FotaCoordinator::cancel`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a cycle is already in progress or has
    /// not been reset since it finished.
    pub fn submit(
        &mut self,
        command: FotaCommand,
        firmware: Option<FirmwareDescriptor>,
    ) -> Result<FotaOutcome> {
        let Some(target) = command.target_state() else {
            return self.cancel();
        };

        let state = self.store.fota_state();
        if !state.is_idle() {
            tracing::warn!(
                command = %command,
                state = %state,
                "Rejecting FOTA command, cycle busy"
            );
            return Err(Error::Busy { state });
        }

        self.store.set_fota_state(FotaState::PendingConfirmation)?;
        if !self.confirm(command) {
            self.store.leave_pending();
            return Ok(FotaOutcome::Declined);
        }

        self.store.transition(target, firmware, None)?;
        tracing::info!(
            command = %command,
            state = %target,
            firmware = ?self.store.firmware().map(FirmwareDescriptor::version),
            "FOTA command accepted"
        );
        Ok(FotaOutcome::Accepted { state: target })
    }

    /// Handles a firmware command carrying an unvalidated version and URI.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Value`] if either value is empty, before any state
    /// changes, and otherwise behaves like [`FotaCoordinator::submit`].
    pub fn submit_with_info(
        &mut self,
        command: FotaCommand,
        version: &str,
        uri: &str,
    ) -> Result<FotaOutcome> {
        let firmware = FirmwareDescriptor::new(version, uri)?;
        self.submit(command, Some(firmware))
    }

    /// Asks the handler whether the running cycle may be cancelled.
    ///
    /// A confirmed cancel ends the cycle in [`FotaState::Failed`] with
    /// [`FotaResult::Cancelled`]. A declined cancel leaves the cycle
    /// running.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NothingToCancel`] if no cycle is running.
    pub fn cancel(&mut self) -> Result<FotaOutcome> {
        let state = self.store.fota_state();
        if !state.is_in_progress() {
            return Err(TransitionError::NothingToCancel { state }.into());
        }
        if !self.confirm(FotaCommand::Cancel) {
            return Ok(FotaOutcome::Declined);
        }

        self.store
            .transition(FotaState::Failed, None, Some(FotaResult::Cancelled))?;
        tracing::info!(from = %state, "FOTA cycle cancelled");
        Ok(FotaOutcome::Accepted {
            state: FotaState::Failed,
        })
    }

    /// Applies a completion signal to the running stage.
    ///
    /// A successful completion moves to [`FotaState::Succeeded`] with
    /// [`FotaResult::Success`]; an abort moves to [`FotaState::Failed`] with
    /// the matching failure. Returns the terminal stage entered.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::UnexpectedSignal`] if the signal does not
    /// apply to the current stage.
    pub fn complete(&mut self, signal: FotaSignal) -> Result<FotaState> {
        let state = self.store.fota_state();
        let result = match signal {
            FotaSignal::Abort(reason) if state.is_in_progress() => FotaResult::from(reason),
            _ if signal.completes() == Some(state) => FotaResult::Success,
            _ => return Err(TransitionError::UnexpectedSignal { signal, state }.into()),
        };

        let next = result.terminal_state();
        self.store.transition(next, None, Some(result))?;
        tracing::info!(signal = %signal, state = %next, result = %result, "FOTA cycle finished");
        Ok(next)
    }

    /// Clears a finished cycle and returns to idle.
    ///
    /// Resetting an idle coordinator changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::ResetWhileInProgress`] while a cycle is
    /// running; running cycles end through [`FotaCoordinator::complete`] or
    /// [`FotaCoordinator::cancel`].
    pub fn reset(&mut self) -> Result<()> {
        let state = self.store.fota_state();
        if state.is_in_progress() {
            return Err(TransitionError::ResetWhileInProgress { state }.into());
        }
        self.store.set_fota_state(FotaState::Idle)?;
        Ok(())
    }

    /// Returns the current lifecycle stage.
    #[must_use]
    pub fn state(&self) -> FotaState {
        self.store.fota_state()
    }

    /// Returns a snapshot of the firmware update state.
    #[must_use]
    pub fn snapshot(&self) -> FotaSnapshot {
        self.store.fota_snapshot()
    }

    fn confirm(&self, command: FotaCommand) -> bool {
        match self.callbacks.confirm(command) {
            Some(true) => true,
            Some(false) => {
                tracing::info!(command = %command, "FOTA command declined");
                false
            }
            None => {
                tracing::debug!(command = %command, "No FOTA command handler, declining");
                false
            }
        }
    }
}
