// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use super::{Device, DeviceHandle};

/// A [`Device`] behind a mutex, shared between threads.
///
/// Every clone refers to the same device. Callbacks run while the lock is
/// held, so they must not lock the device again.
#[derive(Debug, Clone)]
pub struct SharedDevice {
    inner: Arc<Mutex<Device>>,
    handle: DeviceHandle,
}

impl SharedDevice {
    /// Wraps a device.
    #[must_use]
    pub fn new(device: Device) -> Self {
        let handle = device.handle();
        Self {
            inner: Arc::new(Mutex::new(device)),
            handle,
        }
    }

    /// Locks the device.
    pub fn lock(&self) -> MutexGuard<'_, Device> {
        self.inner.lock()
    }

    /// Runs `f` with the device locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut Device) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Returns a posting handle without taking the lock.
    #[must_use]
    pub fn handle(&self) -> DeviceHandle {
        self.handle.clone()
    }

    /// Returns the device if this is the last reference.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged while other clones exist.
    pub fn try_unwrap(self) -> Result<Device, Self> {
        let handle = self.handle;
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner, handle })
    }
}

impl From<Device> for SharedDevice {
    fn from(device: Device) -> Self {
        Self::new(device)
    }
}
