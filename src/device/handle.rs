// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cloneable handle for posting work to a device from any thread.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::futures::Notified;
use tokio::sync::{Notify, mpsc, watch};
use tokio::time::Instant;

use crate::cloud::CloudEvent;
use crate::fota::FotaSignal;
use crate::types::{FirmwareDescriptor, FotaCommand};

use super::inbox::{Posted, Trigger};

/// Posts triggers to a [`Device`](crate::Device) and controls its event loop.
///
/// Handles are cheap to clone and can be moved to the threads or tasks where
/// transport callbacks run. Posted triggers are handled on the device's next
/// [`poll`](crate::Device::poll); posting also wakes a running
/// [`EventLoop`](crate::EventLoop).
///
/// Posting methods return `false` once the device has been dropped.
///
/// # Examples
///
/// ```
/// use lifecore_lib::Device;
/// use lifecore_lib::cloud::CloudEvent;
/// use lifecore_lib::types::CloudFlag;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut device = Device::new(0);
/// let handle = device.handle();
///
/// std::thread::spawn(move || {
///     handle.post_cloud_event(CloudEvent::Connected);
/// })
/// .join()
/// .unwrap();
///
/// device.poll(tokio::time::Instant::now());
/// assert!(device.cloud_status().contains(CloudFlag::Registered));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeviceHandle {
    tx: mpsc::UnboundedSender<Posted>,
    wake: Arc<Notify>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl DeviceHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Posted>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            tx,
            wake: Arc::new(Notify::new()),
            shutdown: Arc::new(shutdown),
        }
    }

    /// Posts a cloud lifecycle trigger.
    ///
    /// Cloud triggers posted before the same processing step are delivered
    /// to the status handler as one notification.
    pub fn post_cloud_event(&self, event: CloudEvent) -> bool {
        self.post(Posted::Now(Trigger::Cloud(event)))
    }

    /// Schedules a cloud lifecycle trigger after `delay`.
    ///
    /// Scheduled cloud triggers are dropped when the cloud manager stops.
    pub fn schedule_cloud_event(&self, event: CloudEvent, delay: Duration) -> bool {
        self.post(Posted::At(Instant::now() + delay, Trigger::Cloud(event)))
    }

    /// Posts a firmware update command.
    ///
    /// Failures are logged, since no caller is waiting for the result.
    pub fn post_fota_command(
        &self,
        command: FotaCommand,
        firmware: Option<FirmwareDescriptor>,
    ) -> bool {
        self.post(Posted::Now(Trigger::FotaCommand { command, firmware }))
    }

    /// Posts a firmware update completion signal.
    pub fn post_fota_signal(&self, signal: FotaSignal) -> bool {
        self.post(Posted::Now(Trigger::FotaSignal(signal)))
    }

    /// Schedules a firmware update completion signal after `delay`.
    pub fn schedule_fota_signal(&self, signal: FotaSignal, delay: Duration) -> bool {
        self.post(Posted::At(Instant::now() + delay, Trigger::FotaSignal(signal)))
    }

    /// Wakes the event loop without posting anything.
    ///
    /// A wake sent while the loop is busy is kept until its next wait.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Asks the event loop to exit after the current step.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
        tracing::debug!("Event loop shutdown requested");
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) was called.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    #[cfg_attr(not(feature = "event-loop"), allow(dead_code))]
    pub(crate) fn notified(&self) -> Notified<'_> {
        self.wake.notified()
    }

    #[cfg_attr(not(feature = "event-loop"), allow(dead_code))]
    pub(crate) fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    fn post(&self, posted: Posted) -> bool {
        let sent = self.tx.send(posted).is_ok();
        if sent {
            self.wake();
        }
        sent
    }
}
