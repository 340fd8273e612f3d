use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::store::collections;
use crate::store::models::{DeviceCollection, DeviceRecord};
use crate::store::{FileStore, StoreError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("device is already approved")]
    AlreadyApproved,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Tracks which devices have asked to pair and which ones the owner approved.
///
/// Both collections sit behind one lock: approval moves a record between
/// them, and an identifier must never be visible in both at once.
pub struct DeviceRegistry {
    lock: Mutex<()>,
    store: Arc<FileStore>,
}

impl DeviceRegistry {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self {
            lock: Mutex::new(()),
            store,
        }
    }

    /// Whether the identifier has been approved by the owner.
    pub async fn is_approved(&self, identifier: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let approved: DeviceCollection = self.store.read(collections::APPROVED_DEVICES)?;
        Ok(approved.devices.iter().any(|d| d.identifier == identifier))
    }

    /// Queue a device for owner approval.
    ///
    /// Registering an identifier that is already pending refreshes its
    /// stored name in place rather than appending a duplicate. An already
    /// approved identifier is rejected.
    pub async fn register_pending(&self, device: DeviceRecord) -> Result<(), RegistryError> {
        let _guard = self.lock.lock().await;

        let approved: DeviceCollection = self.store.read(collections::APPROVED_DEVICES)?;
        if approved
            .devices
            .iter()
            .any(|d| d.identifier == device.identifier)
        {
            return Err(RegistryError::AlreadyApproved);
        }

        let mut pending: DeviceCollection = self.store.read(collections::PENDING_DEVICES)?;
        match pending
            .devices
            .iter_mut()
            .find(|d| d.identifier == device.identifier)
        {
            Some(existing) => *existing = device,
            None => pending.devices.push(device),
        }
        self.store.write(collections::PENDING_DEVICES, &pending)?;
        Ok(())
    }

    /// Resolve a pending request. Accepting moves the record into the
    /// approved collection; rejecting drops it. An identifier with no
    /// pending request is a no-op either way.
    pub async fn decide(&self, identifier: &str, accept: bool) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut pending: DeviceCollection = self.store.read(collections::PENDING_DEVICES)?;
        let mut chosen: Option<DeviceRecord> = None;
        pending.devices.retain(|d| {
            if d.identifier == identifier {
                if chosen.is_none() {
                    chosen = Some(d.clone());
                }
                return false;
            }
            true
        });

        let Some(device) = chosen else {
            return Ok(());
        };

        if accept {
            let mut approved: DeviceCollection = self.store.read(collections::APPROVED_DEVICES)?;
            if !approved.devices.iter().any(|d| d.identifier == identifier) {
                approved.devices.push(device);
            }
            // Approved persists before pending: a crash between the writes
            // leaves the request still visible, and replaying the decision
            // heals the overlap instead of duplicating the record.
            self.store.write(collections::APPROVED_DEVICES, &approved)?;
        }
        self.store.write(collections::PENDING_DEVICES, &pending)?;

        tracing::debug!(identifier = %identifier, accept, "Resolved pending device");
        Ok(())
    }

    /// Drop an identifier from the approved collection. Idempotent.
    pub async fn remove(&self, identifier: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut approved: DeviceCollection = self.store.read(collections::APPROVED_DEVICES)?;
        approved.devices.retain(|d| d.identifier != identifier);
        self.store.write(collections::APPROVED_DEVICES, &approved)?;

        tracing::debug!(identifier = %identifier, "Removed approved device");
        Ok(())
    }

    /// Current contents of both collections, pending first.
    pub async fn snapshot(&self) -> Result<(Vec<DeviceRecord>, Vec<DeviceRecord>), StoreError> {
        let _guard = self.lock.lock().await;
        let pending: DeviceCollection = self.store.read(collections::PENDING_DEVICES)?;
        let approved: DeviceCollection = self.store.read(collections::APPROVED_DEVICES)?;
        Ok((pending.devices, approved.devices))
    }
}
