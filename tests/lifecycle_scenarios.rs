// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the device lifecycle through the public API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lifecore_lib::cloud::{CloudContext, CloudEvent};
use lifecore_lib::fota::{AbortReason, FotaOutcome, FotaSignal};
use lifecore_lib::state::FotaSnapshot;
use lifecore_lib::types::{
    CloudFlag, CloudStatus, FirmwareDescriptor, FotaCommand, FotaResult, FotaState,
};
use lifecore_lib::{Device, Error, UserData};
use parking_lot::Mutex;

fn firmware() -> FirmwareDescriptor {
    FirmwareDescriptor::new("1.2.0", "https://fw/1.2.0.bin").unwrap()
}

// ============================================================================
// Firmware Update Scenarios
// ============================================================================

mod fota {
    use super::*;

    #[test]
    fn accepted_download_records_descriptor() {
        let mut device = Device::new(0);
        let rx = device.subscribe_fota();
        let seen_in_handler = Arc::new(Mutex::new(Vec::new()));

        let seen = seen_in_handler.clone();
        device.register_fota_cmd_handler(move |cmd| {
            seen.lock().push((cmd, rx.borrow().state));
            true
        });

        let outcome = device
            .fota()
            .submit(FotaCommand::StartDownload, Some(firmware()))
            .unwrap();

        assert_eq!(
            outcome,
            FotaOutcome::Accepted {
                state: FotaState::Downloading
            }
        );
        assert_eq!(
            *seen_in_handler.lock(),
            vec![(FotaCommand::StartDownload, FotaState::PendingConfirmation)]
        );
        assert_eq!(device.fota_state(), FotaState::Downloading);
        assert_eq!(device.firmware(), Some(&firmware()));
        assert_eq!(device.firmware().unwrap().version(), "1.2.0");
        assert_eq!(device.firmware().unwrap().uri(), "https://fw/1.2.0.bin");
        assert_eq!(device.fota_result(), None);
    }

    #[test]
    fn declined_download_returns_to_idle() {
        let mut device = Device::new(0);
        device.register_fota_cmd_handler(|_| false);

        let outcome = device
            .fota()
            .submit(FotaCommand::StartDownload, Some(firmware()))
            .unwrap();

        assert_eq!(outcome, FotaOutcome::Declined);
        assert_eq!(device.fota_state(), FotaState::Idle);
        assert!(device.firmware().is_none());
        assert_eq!(device.fota_result(), None);
    }

    #[test]
    fn declined_command_keeps_fw_info() {
        let mut device = Device::new(0);
        device.set_fw_info("1.0", "coap://fw/1.0").unwrap();
        device.register_fota_cmd_handler(|_| false);

        let outcome = device
            .fota()
            .submit(FotaCommand::StartDownload, None)
            .unwrap();

        assert_eq!(outcome, FotaOutcome::Declined);
        assert_eq!(device.fota_state(), FotaState::Idle);
        let firmware = device.firmware().unwrap();
        assert_eq!(firmware.version(), "1.0");
        assert_eq!(firmware.uri(), "coap://fw/1.0");
        assert_eq!(device.fota_result(), None);
    }

    #[test]
    fn result_must_match_terminal_stage() {
        let mut device = Device::new(0);
        device.set_fota_state(FotaState::Succeeded).unwrap();

        let err = device
            .set_fota_result(FotaResult::InstallFailed)
            .unwrap_err();
        assert_eq!(err.code(), Error::CODE_INVALID_TRANSITION);
        assert_eq!(device.fota_result(), None);

        device.set_fota_result(FotaResult::Success).unwrap();
        assert_eq!(device.fota_result(), Some(FotaResult::Success));
    }

    #[test]
    fn command_while_downloading_is_busy() {
        let mut device = Device::new(0);
        device.register_fota_cmd_handler(|_| true);
        device
            .fota()
            .submit(FotaCommand::StartDownload, Some(firmware()))
            .unwrap();
        let before = device.fota_snapshot();

        let err = device
            .fota()
            .submit(FotaCommand::ApplyUpdate, None)
            .unwrap_err();

        assert!(err.is_busy());
        assert_eq!(err.code(), Error::CODE_BUSY);
        assert_eq!(device.fota_snapshot(), before);
    }

    #[test]
    fn full_cycle_then_reset() {
        let mut device = Device::new(0);
        device.register_fota_cmd_handler(|_| true);

        device
            .fota()
            .submit(FotaCommand::ApplyUpdate, Some(firmware()))
            .unwrap();
        assert_eq!(device.fota_state(), FotaState::Installing);
        assert_eq!(device.fota_result(), None);

        device
            .fota()
            .complete(FotaSignal::Abort(AbortReason::InstallFailed))
            .unwrap();
        assert_eq!(device.fota_state(), FotaState::Failed);
        assert_eq!(device.fota_result(), Some(FotaResult::InstallFailed));

        device.fota().reset().unwrap();
        assert_eq!(device.fota_snapshot(), FotaSnapshot::default());

        // A new cycle sees no result from the previous one
        device
            .fota()
            .submit(FotaCommand::CheckForUpdate, None)
            .unwrap();
        assert_eq!(device.fota_result(), None);
    }

    #[test]
    fn reset_twice_is_a_noop() {
        let mut device = Device::new(0);
        device.set_fota_state(FotaState::Downloading).unwrap();
        device.set_fw_info("2.0.0", "coap://fw/2.0.0.bin").unwrap();
        device.set_fota_state(FotaState::Succeeded).unwrap();
        device.set_fota_result(FotaResult::Success).unwrap();

        device.set_fota_state(FotaState::Idle).unwrap();
        let after_first = device.fota_snapshot();
        device.set_fota_state(FotaState::Idle).unwrap();

        assert_eq!(device.fota_snapshot(), after_first);
        assert_eq!(device.fota_result(), None);
        assert!(device.firmware().is_none());
    }

    #[test]
    fn terminal_to_terminal_is_rejected() {
        let mut device = Device::new(0);
        device.set_fota_state(FotaState::Succeeded).unwrap();

        let err = device.set_fota_state(FotaState::Failed).unwrap_err();
        assert_eq!(err.code(), Error::CODE_INVALID_TRANSITION);
        assert_eq!(device.fota_state(), FotaState::Succeeded);
    }

    #[test]
    fn result_requires_terminal_stage() {
        let mut device = Device::new(0);
        device.set_fota_state(FotaState::Downloading).unwrap();

        let err = device.set_fota_result(FotaResult::Success).unwrap_err();
        assert_eq!(err.code(), Error::CODE_INVALID_TRANSITION);
        assert_eq!(device.fota_result(), None);
    }

    #[test]
    fn empty_fw_info_is_invalid_argument() {
        let mut device = Device::new(0);

        for (version, uri) in [("", "coap://fw"), ("1.0", ""), ("  ", "coap://fw")] {
            let err = device.set_fw_info(version, uri).unwrap_err();
            assert_eq!(err.code(), Error::CODE_INVALID_ARGUMENT);
        }
        assert!(device.firmware().is_none());
    }

    #[test]
    fn snapshot_survives_restart() {
        let mut device = Device::new(0);
        device.register_fota_cmd_handler(|_| true);
        device
            .fota()
            .submit(FotaCommand::StartDownload, Some(firmware()))
            .unwrap();
        let json = device.shutdown().to_json().unwrap();

        let mut restarted = Device::new(0);
        restarted
            .restore_fota(FotaSnapshot::from_json(&json).unwrap())
            .unwrap();
        assert_eq!(restarted.fota_state(), FotaState::Downloading);
        assert_eq!(restarted.firmware(), Some(&firmware()));

        restarted
            .fota()
            .complete(FotaSignal::DownloadComplete)
            .unwrap();
        assert_eq!(restarted.fota_result(), Some(FotaResult::Success));
    }
}

// ============================================================================
// Cloud Status Scenarios
// ============================================================================

mod cloud {
    use super::*;

    type Seen = Arc<Mutex<Vec<(CloudStatus, Option<CloudContext>)>>>;

    fn recording(device: &mut Device) -> Seen {
        let seen = Seen::default();
        let sink = seen.clone();
        device.cloud().start(
            move |ctx, status, _data| sink.lock().push((status, ctx.copied())),
            None,
        );
        seen
    }

    #[test]
    fn trigger_sequence_dispatches_each_flag() {
        let mut device = Device::new(2);
        let seen = recording(&mut device);

        device.cloud().handle(CloudEvent::Connected).unwrap();
        device
            .cloud()
            .handle(CloudEvent::TokenRefreshDue { expires_in: 3600 })
            .unwrap();
        assert_eq!(device.token_expiry(), Some(3600));
        device.cloud().handle(CloudEvent::Failure).unwrap();

        let seen = seen.lock();
        let flags: Vec<_> = seen.iter().map(|(status, _)| *status).collect();
        assert_eq!(
            flags,
            vec![
                CloudStatus::from(CloudFlag::Registered),
                CloudStatus::from(CloudFlag::TokenExpiring),
                CloudStatus::from(CloudFlag::Failed),
            ]
        );
        assert!(seen.iter().all(|(_, ctx)| ctx.is_some_and(|c| c.device() == 2)));
        assert_eq!(device.token_expiry(), Some(3600));
    }

    #[test]
    fn status_without_expiry_flag_ignores_expiry() {
        let mut device = Device::new(0);
        let all_but_expiring: Vec<_> = CloudFlag::ALL
            .into_iter()
            .filter(|flag| *flag != CloudFlag::TokenExpiring)
            .collect();

        // Every subset of the remaining flags, including the empty set
        for mask in 0_u32..(1 << all_but_expiring.len()) {
            let status: CloudStatus = all_but_expiring
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, flag)| *flag)
                .collect();

            for expiry in [None, Some(0), Some(u32::MAX)] {
                device.set_status(status, expiry).unwrap();
                assert_eq!(device.cloud_status(), status);
            }
        }
        assert_eq!(device.token_expiry(), None);
    }

    #[test]
    fn expiring_without_expiry_leaves_store_unchanged() {
        let mut device = Device::new(0);
        device
            .set_status(CloudStatus::from(CloudFlag::TokenExpiring), Some(60))
            .unwrap();

        let err = device
            .set_status(
                CloudStatus::from(CloudFlag::TokenExpiring).with(CloudFlag::LoggedIn),
                None,
            )
            .unwrap_err();

        assert_eq!(err.code(), Error::CODE_INVALID_ARGUMENT);
        assert_eq!(
            device.cloud_status(),
            CloudStatus::from(CloudFlag::TokenExpiring)
        );
        assert_eq!(device.token_expiry(), Some(60));
    }

    #[test]
    fn direct_status_carries_user_data() {
        let mut device = Device::new(0);
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = seen.clone();
        let user_data: UserData = Arc::new(41_usize);

        device.register_status_handler(
            move |ctx, _status, data| {
                assert!(ctx.is_none());
                let value = data.and_then(|d| d.downcast_ref::<usize>()).copied();
                sink.store(value.unwrap_or(0) + 1, Ordering::SeqCst);
            },
            Some(user_data),
        );

        device
            .set_status(CloudStatus::from(CloudFlag::LoggedOut), None)
            .unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 42);
    }

    #[test]
    fn unregistering_unknown_handlers_has_no_effect() {
        let mut device = Device::new(0);
        device.unregister_status_handler();
        device.unregister_fota_cmd_handler();

        device
            .set_status(CloudStatus::from(CloudFlag::Registered), None)
            .unwrap();
        let outcome = device
            .fota()
            .submit(FotaCommand::CheckForUpdate, None)
            .unwrap();
        assert_eq!(outcome, FotaOutcome::Declined);
    }

    #[test]
    fn unregistered_handler_is_not_invoked() {
        let mut device = Device::new(0);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        device.register_status_handler(
            move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            None,
        );
        device.unregister_status_handler();
        device.unregister_status_handler();

        device
            .set_status(CloudStatus::from(CloudFlag::Deregistered), None)
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn second_registration_replaces_first() {
        let mut device = Device::new(0);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let counter = first.clone();
        device.register_status_handler(
            move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            None,
        );
        let counter = second.clone();
        device.register_status_handler(
            move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            },
            None,
        );

        device
            .set_status(CloudStatus::from(CloudFlag::TokenRefreshed), None)
            .unwrap();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
