// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Status store for cloud connectivity and firmware update state.

use tokio::sync::watch;

use crate::error::{TransitionError, ValueError};
use crate::types::{CloudStatus, FirmwareDescriptor, FotaResult, FotaState};

use super::FotaSnapshot;

/// Current cloud notification and firmware update state of one device.
///
/// The store validates every mutation and leaves its contents untouched when
/// a mutation is rejected. It knows nothing about callbacks; dispatching a
/// new cloud status is the owning [`Device`](crate::Device)'s job.
///
/// Every accepted firmware update mutation is published on a
/// [`watch`] channel, so observers always read the latest [`FotaSnapshot`].
///
/// # Examples
///
/// ```
/// use lifecore_lib::state::StatusStore;
/// use lifecore_lib::types::{FotaResult, FotaState};
///
/// let mut store = StatusStore::new();
/// store.set_fota_state(FotaState::Downloading).unwrap();
///
/// // Results are only accepted once the cycle is terminal
/// assert!(store.set_fota_result(FotaResult::Success).is_err());
///
/// store.set_fota_state(FotaState::Succeeded).unwrap();
/// store.set_fota_result(FotaResult::Success).unwrap();
/// assert_eq!(store.fota_result(), Some(FotaResult::Success));
/// ```
#[derive(Debug)]
pub struct StatusStore {
    /// Flags of the most recent cloud notification.
    cloud_status: CloudStatus,
    /// Last recorded token expiry in seconds.
    token_expiry: Option<u32>,
    /// Firmware update state.
    fota: FotaSnapshot,
    /// Watch channel sender for firmware update snapshots.
    fota_tx: watch::Sender<FotaSnapshot>,
}

impl StatusStore {
    /// Creates an empty store: no cloud status, unknown expiry, idle update.
    #[must_use]
    pub fn new() -> Self {
        let fota = FotaSnapshot::default();
        let (fota_tx, _) = watch::channel(fota.clone());
        Self {
            cloud_status: CloudStatus::empty(),
            token_expiry: None,
            fota,
            fota_tx,
        }
    }

    // ========== Cloud Status ==========

    /// Replaces the current cloud notification payload.
    ///
    /// `expiry` is the number of seconds until the access token expires. It
    /// is required when `status` carries the token-expiring flag and
    /// ignored otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::MissingTokenExpiry`] if the token-expiring flag
    /// is set without an expiry. The store is unchanged in that case.
    pub fn set_status(
        &mut self,
        status: CloudStatus,
        expiry: Option<u32>,
    ) -> Result<(), ValueError> {
        if status.is_token_expiring() {
            let Some(seconds) = expiry else {
                return Err(ValueError::MissingTokenExpiry);
            };
            self.token_expiry = Some(seconds);
        }
        self.cloud_status = status;
        Ok(())
    }

    /// Returns the flags of the most recent cloud notification.
    #[must_use]
    pub fn cloud_status(&self) -> CloudStatus {
        self.cloud_status
    }

    /// Returns the last recorded token expiry in seconds.
    ///
    /// Returns `None` if no token-expiring notification was ever recorded.
    #[must_use]
    pub fn token_expiry(&self) -> Option<u32> {
        self.token_expiry
    }

    // ========== Firmware Update ==========

    /// Moves the firmware update lifecycle to `state`.
    ///
    /// Setting [`FotaState::Idle`] is a reset: it clears the result and the
    /// firmware descriptor and starts a new cycle. Setting the current state
    /// again changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::TerminalToTerminal`] for a jump between
    /// terminal stages and [`TransitionError::Backward`] for any other move
    /// that does not go forward.
    pub fn set_fota_state(&mut self, state: FotaState) -> Result<(), TransitionError> {
        check_transition(self.fota.state, state)?;
        if state == self.fota.state && !state.is_idle() {
            return Ok(());
        }

        let mut next = self.fota.clone();
        next.state = state;
        if state.is_idle() {
            next.result = None;
            next.firmware = None;
        }
        self.publish(next);
        Ok(())
    }

    /// Records the firmware version and retrieval URI as a pair.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::EmptyVersion`] or [`ValueError::EmptyUri`] if
    /// either value is empty.
    pub fn set_fw_info(&mut self, version: &str, uri: &str) -> Result<(), ValueError> {
        let firmware = FirmwareDescriptor::new(version, uri)?;
        self.set_firmware(firmware);
        Ok(())
    }

    /// Records an already validated firmware descriptor.
    pub fn set_firmware(&mut self, firmware: FirmwareDescriptor) {
        let mut next = self.fota.clone();
        next.firmware = Some(firmware);
        self.publish(next);
    }

    /// Records the outcome of the current cycle.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::ResultWhileNonTerminal`] unless the cycle
    /// is in a terminal stage, [`TransitionError::ResultAlreadySet`] if the
    /// cycle already has a result, and [`TransitionError::ResultMismatch`] if
    /// the result belongs to the other terminal stage.
    pub fn set_fota_result(&mut self, result: FotaResult) -> Result<(), TransitionError> {
        if !self.fota.state.is_terminal() {
            return Err(TransitionError::ResultWhileNonTerminal {
                state: self.fota.state,
            });
        }
        if let Some(existing) = self.fota.result {
            return Err(TransitionError::ResultAlreadySet { result: existing });
        }
        check_result(self.fota.state, result)?;

        let mut next = self.fota.clone();
        next.result = Some(result);
        self.publish(next);
        Ok(())
    }

    /// Moves to `state` and applies the accompanying descriptor and result
    /// in one step.
    ///
    /// Everything is validated before anything is written, so either the
    /// whole transition is observable or none of it is.
    pub(crate) fn transition(
        &mut self,
        state: FotaState,
        firmware: Option<FirmwareDescriptor>,
        result: Option<FotaResult>,
    ) -> Result<(), TransitionError> {
        check_transition(self.fota.state, state)?;
        if result.is_some() && !state.is_terminal() {
            return Err(TransitionError::ResultWhileNonTerminal { state });
        }
        if let (Some(existing), Some(_)) = (self.fota.result, result) {
            return Err(TransitionError::ResultAlreadySet { result: existing });
        }
        if let Some(result) = result {
            check_result(state, result)?;
        }

        let mut next = self.fota.clone();
        next.state = state;
        if state.is_idle() {
            next.result = None;
            next.firmware = None;
        }
        if firmware.is_some() {
            next.firmware = firmware;
        }
        if result.is_some() {
            next.result = result;
        }
        self.publish(next);
        Ok(())
    }

    /// Leaves pending confirmation for idle after a declined command.
    ///
    /// Unlike a reset, the descriptor recorded before the command arrived is
    /// kept.
    pub(crate) fn leave_pending(&mut self) {
        if self.fota.state != FotaState::PendingConfirmation {
            return;
        }
        let mut next = self.fota.clone();
        next.state = FotaState::Idle;
        self.publish(next);
    }

    /// Returns the current lifecycle stage.
    #[must_use]
    pub fn fota_state(&self) -> FotaState {
        self.fota.state
    }

    /// Returns the result of the current cycle.
    ///
    /// Always `None` before the cycle reaches a terminal stage.
    #[must_use]
    pub fn fota_result(&self) -> Option<FotaResult> {
        self.fota.result
    }

    /// Returns the firmware descriptor of the current cycle.
    #[must_use]
    pub fn firmware(&self) -> Option<&FirmwareDescriptor> {
        self.fota.firmware.as_ref()
    }

    /// Returns a snapshot of the firmware update state.
    #[must_use]
    pub fn fota_snapshot(&self) -> FotaSnapshot {
        self.fota.clone()
    }

    /// Subscribes to firmware update snapshots.
    ///
    /// The receiver always holds the latest snapshot.
    #[must_use]
    pub fn subscribe_fota(&self) -> watch::Receiver<FotaSnapshot> {
        self.fota_tx.subscribe()
    }

    /// Replaces the firmware update state with a persisted snapshot.
    ///
    /// A snapshot caught waiting for confirmation restores as idle, since the
    /// confirmation was never answered.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::ResultWhileNonTerminal`] for a result on a
    /// non-terminal stage, [`TransitionError::MissingResult`] for a terminal
    /// stage without a result and [`TransitionError::ResultMismatch`] for a
    /// result of the other terminal stage. The store is unchanged on error.
    pub fn restore_fota(&mut self, snapshot: FotaSnapshot) -> Result<(), TransitionError> {
        let snapshot = if snapshot.state == FotaState::PendingConfirmation {
            FotaSnapshot::default()
        } else {
            snapshot
        };

        match (snapshot.state.is_terminal(), snapshot.result) {
            (false, Some(_)) => {
                return Err(TransitionError::ResultWhileNonTerminal {
                    state: snapshot.state,
                });
            }
            (true, None) => {
                return Err(TransitionError::MissingResult {
                    state: snapshot.state,
                });
            }
            (true, Some(result)) => check_result(snapshot.state, result)?,
            (false, None) => {}
        }

        self.publish(snapshot);
        Ok(())
    }

    fn publish(&mut self, next: FotaSnapshot) {
        if next.state != self.fota.state {
            tracing::debug!(from = %self.fota.state, to = %next.state, "FOTA state changed");
        }
        self.fota = next;
        self.fota_tx.send_replace(self.fota.clone());
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks the monotonic ordering of firmware update stages.
fn check_transition(from: FotaState, to: FotaState) -> Result<(), TransitionError> {
    if to == from || to.is_idle() {
        return Ok(());
    }
    if from.is_terminal() && to.is_terminal() {
        return Err(TransitionError::TerminalToTerminal { from, to });
    }
    if to.rank() <= from.rank() {
        return Err(TransitionError::Backward { from, to });
    }
    Ok(())
}

/// Checks that a result belongs to the terminal stage it is recorded in.
fn check_result(state: FotaState, result: FotaResult) -> Result<(), TransitionError> {
    if result.terminal_state() == state {
        Ok(())
    } else {
        Err(TransitionError::ResultMismatch { state, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CloudFlag;

    #[test]
    fn new_store_is_empty() {
        let store = StatusStore::new();
        assert!(store.cloud_status().is_empty());
        assert_eq!(store.token_expiry(), None);
        assert_eq!(store.fota_state(), FotaState::Idle);
        assert_eq!(store.fota_result(), None);
        assert!(store.firmware().is_none());
    }

    #[test]
    fn status_without_token_flag_ignores_expiry() {
        let mut store = StatusStore::new();
        for expiry in [None, Some(0), Some(3600)] {
            store
                .set_status(CloudStatus::from(CloudFlag::Registered), expiry)
                .unwrap();
        }
        assert_eq!(store.token_expiry(), None);
        assert_eq!(store.cloud_status(), CloudStatus::from(CloudFlag::Registered));
    }

    #[test]
    fn token_flag_requires_expiry() {
        let mut store = StatusStore::new();
        store
            .set_status(CloudStatus::from(CloudFlag::LoggedIn), None)
            .unwrap();

        let err = store
            .set_status(CloudStatus::from(CloudFlag::TokenExpiring), None)
            .unwrap_err();

        assert_eq!(err, ValueError::MissingTokenExpiry);
        assert_eq!(store.cloud_status(), CloudStatus::from(CloudFlag::LoggedIn));
        assert_eq!(store.token_expiry(), None);
    }

    #[test]
    fn token_expiry_is_kept_after_later_notifications() {
        let mut store = StatusStore::new();
        store
            .set_status(CloudStatus::from(CloudFlag::TokenExpiring), Some(3600))
            .unwrap();
        store
            .set_status(CloudStatus::from(CloudFlag::TokenRefreshed), None)
            .unwrap();
        assert_eq!(store.token_expiry(), Some(3600));
    }

    #[test]
    fn terminal_to_terminal_is_rejected() {
        let mut store = StatusStore::new();
        store.set_fota_state(FotaState::Succeeded).unwrap();

        let err = store.set_fota_state(FotaState::Failed).unwrap_err();
        assert_eq!(
            err,
            TransitionError::TerminalToTerminal {
                from: FotaState::Succeeded,
                to: FotaState::Failed,
            }
        );
        assert_eq!(store.fota_state(), FotaState::Succeeded);
    }

    #[test]
    fn backward_moves_are_rejected() {
        let mut store = StatusStore::new();
        store.set_fota_state(FotaState::Installing).unwrap();

        assert!(matches!(
            store.set_fota_state(FotaState::Downloading),
            Err(TransitionError::Backward { .. })
        ));
        assert_eq!(store.fota_state(), FotaState::Installing);

        store.set_fota_state(FotaState::Failed).unwrap();
        assert!(matches!(
            store.set_fota_state(FotaState::Checking),
            Err(TransitionError::Backward { .. })
        ));
    }

    #[test]
    fn same_state_is_noop() {
        let mut store = StatusStore::new();
        store.set_fota_state(FotaState::Downloading).unwrap();
        store.set_fota_state(FotaState::Downloading).unwrap();
        assert_eq!(store.fota_state(), FotaState::Downloading);
    }

    #[test]
    fn reset_clears_result_and_firmware() {
        let mut store = StatusStore::new();
        store.set_fw_info("1.0", "coap://fw/1.0").unwrap();
        store.set_fota_state(FotaState::Failed).unwrap();
        store.set_fota_result(FotaResult::InstallFailed).unwrap();

        store.set_fota_state(FotaState::Idle).unwrap();
        assert_eq!(store.fota_result(), None);
        assert!(store.firmware().is_none());

        store.set_fota_state(FotaState::Idle).unwrap();
        assert_eq!(store.fota_snapshot(), FotaSnapshot::default());
    }

    #[test]
    fn fw_info_rejects_empty_fields() {
        let mut store = StatusStore::new();
        store.set_fw_info("1.0", "coap://fw/1.0").unwrap();

        assert_eq!(store.set_fw_info("", "coap://fw/2.0"), Err(ValueError::EmptyVersion));
        assert_eq!(store.set_fw_info("2.0", ""), Err(ValueError::EmptyUri));
        assert_eq!(store.firmware().unwrap().version(), "1.0");
    }

    #[test]
    fn result_requires_terminal_and_is_set_once() {
        let mut store = StatusStore::new();
        store.set_fota_state(FotaState::Downloading).unwrap();
        assert_eq!(
            store.set_fota_result(FotaResult::Success),
            Err(TransitionError::ResultWhileNonTerminal {
                state: FotaState::Downloading
            })
        );

        store.set_fota_state(FotaState::Succeeded).unwrap();
        store.set_fota_result(FotaResult::Success).unwrap();
        assert_eq!(
            store.set_fota_result(FotaResult::InstallFailed),
            Err(TransitionError::ResultAlreadySet {
                result: FotaResult::Success
            })
        );
        assert_eq!(store.fota_result(), Some(FotaResult::Success));
    }

    #[test]
    fn result_must_match_terminal_stage() {
        let mut store = StatusStore::new();
        store.set_fota_state(FotaState::Succeeded).unwrap();

        assert_eq!(
            store.set_fota_result(FotaResult::InstallFailed),
            Err(TransitionError::ResultMismatch {
                state: FotaState::Succeeded,
                result: FotaResult::InstallFailed,
            })
        );
        assert_eq!(store.fota_result(), None);

        store.set_fota_state(FotaState::Idle).unwrap();
        store.set_fota_state(FotaState::Failed).unwrap();
        assert!(matches!(
            store.set_fota_result(FotaResult::Success),
            Err(TransitionError::ResultMismatch { .. })
        ));
        store.set_fota_result(FotaResult::Cancelled).unwrap();
        assert_eq!(store.fota_result(), Some(FotaResult::Cancelled));
    }

    #[test]
    fn leave_pending_keeps_firmware() {
        let mut store = StatusStore::new();
        store.set_fw_info("1.0", "coap://fw/1.0").unwrap();
        store.set_fota_state(FotaState::PendingConfirmation).unwrap();

        store.leave_pending();
        assert_eq!(store.fota_state(), FotaState::Idle);
        assert_eq!(store.firmware().unwrap().version(), "1.0");

        // Only applies while pending
        store.set_fota_state(FotaState::Checking).unwrap();
        store.leave_pending();
        assert_eq!(store.fota_state(), FotaState::Checking);
    }

    #[test]
    fn transition_is_all_or_nothing() {
        let mut store = StatusStore::new();
        store.set_fota_state(FotaState::Installing).unwrap();
        let firmware = FirmwareDescriptor::new("2.0", "coap://fw/2.0").unwrap();

        let err = store.transition(FotaState::Downloading, Some(firmware), None);
        assert!(err.is_err());
        assert!(store.firmware().is_none());
        assert_eq!(store.fota_state(), FotaState::Installing);
    }

    #[test]
    fn watch_receives_latest_snapshot() {
        let mut store = StatusStore::new();
        let rx = store.subscribe_fota();

        store.set_fota_state(FotaState::Checking).unwrap();
        assert_eq!(rx.borrow().state, FotaState::Checking);
    }

    #[test]
    fn restore_pending_confirmation_as_idle() {
        let mut store = StatusStore::new();
        store
            .restore_fota(FotaSnapshot {
                state: FotaState::PendingConfirmation,
                result: None,
                firmware: None,
            })
            .unwrap();
        assert_eq!(store.fota_state(), FotaState::Idle);
    }

    #[test]
    fn restore_rejects_inconsistent_snapshots() {
        let mut store = StatusStore::new();

        assert_eq!(
            store.restore_fota(FotaSnapshot {
                state: FotaState::Downloading,
                result: Some(FotaResult::Success),
                firmware: None,
            }),
            Err(TransitionError::ResultWhileNonTerminal {
                state: FotaState::Downloading
            })
        );
        assert_eq!(
            store.restore_fota(FotaSnapshot {
                state: FotaState::Failed,
                result: None,
                firmware: None,
            }),
            Err(TransitionError::MissingResult {
                state: FotaState::Failed
            })
        );
        assert_eq!(
            store.restore_fota(FotaSnapshot {
                state: FotaState::Succeeded,
                result: Some(FotaResult::InstallFailed),
                firmware: None,
            }),
            Err(TransitionError::ResultMismatch {
                state: FotaState::Succeeded,
                result: FotaResult::InstallFailed,
            })
        );
        assert_eq!(store.fota_snapshot(), FotaSnapshot::default());
    }
}
