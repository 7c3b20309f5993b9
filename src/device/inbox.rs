// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Queue of triggers waiting for the next processing step.

use std::collections::{BTreeMap, VecDeque};

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::cloud::CloudEvent;
use crate::fota::FotaSignal;
use crate::types::{FirmwareDescriptor, FotaCommand};

/// Work item handled by [`Device::poll`](crate::Device::poll).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Trigger {
    /// Cloud lifecycle trigger.
    Cloud(CloudEvent),
    /// Firmware command from the cloud or management layer.
    FotaCommand {
        command: FotaCommand,
        firmware: Option<FirmwareDescriptor>,
    },
    /// Completion signal for the running firmware update stage.
    FotaSignal(FotaSignal),
}

impl Trigger {
    fn is_cloud(&self) -> bool {
        matches!(self, Self::Cloud(_))
    }
}

/// Message sent through a [`DeviceHandle`](super::DeviceHandle).
#[derive(Debug)]
pub(crate) enum Posted {
    /// Handle on the next processing step.
    Now(Trigger),
    /// Handle on the first processing step at or after the deadline.
    At(Instant, Trigger),
}

/// Triggers posted from other threads plus triggers scheduled for later.
///
/// Scheduled triggers are ordered by deadline, then by scheduling order.
#[derive(Debug)]
pub(crate) struct Inbox {
    rx: mpsc::UnboundedReceiver<Posted>,
    ready: VecDeque<Trigger>,
    delayed: BTreeMap<(Instant, u64), Trigger>,
    next_seq: u64,
}

impl Inbox {
    /// Creates an empty inbox and the sender feeding it.
    pub fn new() -> (Self, mpsc::UnboundedSender<Posted>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let inbox = Self {
            rx,
            ready: VecDeque::new(),
            delayed: BTreeMap::new(),
            next_seq: 0,
        };
        (inbox, tx)
    }

    /// Schedules a trigger for the first step at or after `at`.
    pub fn schedule(&mut self, at: Instant, trigger: Trigger) {
        self.delayed.insert((at, self.next_seq), trigger);
        self.next_seq += 1;
    }

    /// Takes every trigger due at `now`.
    ///
    /// Scheduled triggers come first, in deadline order, followed by posted
    /// triggers in posting order.
    pub fn drain(&mut self, now: Instant) -> Vec<Trigger> {
        self.pull();

        let mut due = Vec::new();
        while let Some(entry) = self.delayed.first_entry() {
            if entry.key().0 > now {
                break;
            }
            due.push(entry.remove());
        }
        due.extend(self.ready.drain(..));
        due
    }

    /// Returns the earliest scheduled deadline.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.pull();
        if !self.ready.is_empty() {
            return Some(Instant::now());
        }
        self.delayed.keys().next().map(|(at, _)| *at)
    }

    /// Drops every pending cloud trigger and returns how many were dropped.
    pub fn cancel_cloud_events(&mut self) -> usize {
        self.pull();
        let before = self.ready.len() + self.delayed.len();
        self.ready.retain(|trigger| !trigger.is_cloud());
        self.delayed.retain(|_, trigger| !trigger.is_cloud());
        before - (self.ready.len() + self.delayed.len())
    }

    /// Returns the number of triggers not yet handled.
    pub fn len(&mut self) -> usize {
        self.pull();
        self.ready.len() + self.delayed.len()
    }

    fn pull(&mut self) {
        while let Ok(posted) = self.rx.try_recv() {
            match posted {
                Posted::Now(trigger) => self.ready.push_back(trigger),
                Posted::At(at, trigger) => self.schedule(at, trigger),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn drain_returns_due_then_posted() {
        let (mut inbox, tx) = Inbox::new();
        let now = Instant::now();

        tx.send(Posted::Now(Trigger::Cloud(CloudEvent::SessionStarted)))
            .unwrap();
        inbox.schedule(now, Trigger::Cloud(CloudEvent::Connected));
        inbox.schedule(
            now + Duration::from_secs(5),
            Trigger::Cloud(CloudEvent::TokenRotated),
        );

        let due = inbox.drain(now);
        assert_eq!(
            due,
            vec![
                Trigger::Cloud(CloudEvent::Connected),
                Trigger::Cloud(CloudEvent::SessionStarted),
            ]
        );
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox.next_deadline(), Some(now + Duration::from_secs(5)));
    }

    #[test]
    fn same_deadline_keeps_scheduling_order() {
        let (mut inbox, _tx) = Inbox::new();
        let at = Instant::now();
        inbox.schedule(at, Trigger::Cloud(CloudEvent::Failure));
        inbox.schedule(at, Trigger::Cloud(CloudEvent::Deregistered));

        assert_eq!(
            inbox.drain(at),
            vec![
                Trigger::Cloud(CloudEvent::Failure),
                Trigger::Cloud(CloudEvent::Deregistered),
            ]
        );
    }

    #[test]
    fn posted_delayed_triggers_are_scheduled() {
        let (mut inbox, tx) = Inbox::new();
        let at = Instant::now() + Duration::from_secs(30);
        tx.send(Posted::At(at, Trigger::FotaSignal(FotaSignal::DownloadComplete)))
            .unwrap();

        assert_eq!(inbox.next_deadline(), Some(at));
        assert!(inbox.drain(at - Duration::from_secs(1)).is_empty());
        assert_eq!(inbox.drain(at).len(), 1);
        assert_eq!(inbox.next_deadline(), None);
    }

    #[test]
    fn cancel_drops_only_cloud_triggers() {
        let (mut inbox, tx) = Inbox::new();
        let later = Instant::now() + Duration::from_secs(60);
        tx.send(Posted::Now(Trigger::Cloud(CloudEvent::Connected)))
            .unwrap();
        inbox.schedule(later, Trigger::Cloud(CloudEvent::TokenRotated));
        inbox.schedule(later, Trigger::FotaSignal(FotaSignal::InstallComplete));

        assert_eq!(inbox.cancel_cloud_events(), 2);
        assert_eq!(inbox.len(), 1);
    }
}
