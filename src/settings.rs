use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::store::collections;
use crate::store::models::Settings;
use crate::store::{FileStore, StoreError};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("destination is not a usable directory: {0}")]
    DestinationInvalid(String),
    #[error("destination directory does not exist")]
    DestinationMissing,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Persisted operator preferences, currently just the upload destination.
pub struct SettingsStore {
    lock: Mutex<()>,
    store: Arc<FileStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<FileStore>) -> Self {
        Self {
            lock: Mutex::new(()),
            store,
        }
    }

    /// Current settings, defaults when never saved.
    pub async fn load(&self) -> Result<Settings, StoreError> {
        let _guard = self.lock.lock().await;
        self.store.read(collections::SETTINGS)
    }

    /// Point uploads at a different directory. The directory must already
    /// exist; creating it is the owner's call, not the service's.
    pub async fn set_destination(&self, destination: &str) -> Result<(), SettingsError> {
        match std::fs::metadata(destination) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(SettingsError::DestinationInvalid(destination.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SettingsError::DestinationMissing)
            }
            Err(e) => return Err(SettingsError::DestinationInvalid(e.to_string())),
        }

        let _guard = self.lock.lock().await;
        let mut settings: Settings = self.store.read(collections::SETTINGS)?;
        settings.destination = destination.to_string();
        self.store.write(collections::SETTINGS, &settings)?;

        info!(destination = %destination, "Updated upload destination");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[tokio::test]
    async fn test_load_defaults_when_never_saved() {
        let (store, _dir) = testutil::setup_store();
        let settings = SettingsStore::new(store);

        let loaded = settings.load().await.unwrap();
        assert_eq!(loaded.destination, "./received");
    }

    #[tokio::test]
    async fn test_set_destination_requires_existing_directory() {
        let (store, _dir) = testutil::setup_store();
        let settings = SettingsStore::new(store);

        let result = settings.set_destination("/no/such/directory").await;
        assert!(matches!(result, Err(SettingsError::DestinationMissing)));
    }

    #[tokio::test]
    async fn test_set_destination_rejects_plain_files() {
        let (store, dir) = testutil::setup_store();
        let settings = SettingsStore::new(store);

        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"x").unwrap();

        let result = settings.set_destination(file.to_str().unwrap()).await;
        assert!(matches!(result, Err(SettingsError::DestinationInvalid(_))));
    }

    #[tokio::test]
    async fn test_set_destination_persists() {
        let (store, dir) = testutil::setup_store();
        let settings = SettingsStore::new(store);

        let dest = dir.path().join("drops");
        std::fs::create_dir(&dest).unwrap();

        settings
            .set_destination(dest.to_str().unwrap())
            .await
            .unwrap();

        let loaded = settings.load().await.unwrap();
        assert_eq!(loaded.destination, dest.to_str().unwrap());
    }
}
