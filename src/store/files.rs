use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// JSON collections under one data directory.
///
/// The store itself does no locking. Callers own a mutual-exclusion scope
/// spanning their whole read-modify-write sequence.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at the given directory, creating it if absent
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        std::fs::create_dir_all(root.as_ref())?;
        Ok(Self {
            root: root.as_ref().to_path_buf(),
        })
    }

    /// Read a whole collection. An absent file yields the default value,
    /// so first boot starts from empty collections.
    pub fn read<T>(&self, name: &str) -> Result<T, StoreError>
    where
        T: DeserializeOwned + Default,
    {
        let path = self.collection_path(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Replace a whole collection. The new content lands in a temp file in
    /// the same directory and is renamed over the old one, so readers never
    /// observe a half-written file.
    pub fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let path = self.collection_path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &data)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::{DeviceCollection, DeviceRecord};
    use tempfile::TempDir;

    fn setup() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).unwrap();
        (store, temp_dir)
    }

    #[test]
    fn test_absent_collection_reads_as_default() {
        let (store, _temp) = setup();

        let collection: DeviceCollection = store.read("devices/saved_devices").unwrap();
        assert!(collection.devices.is_empty());
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let (store, _temp) = setup();

        let mut collection = DeviceCollection::default();
        collection.devices.push(DeviceRecord {
            identifier: "abc".to_string(),
            name: "Phone".to_string(),
        });
        store.write("devices/saved_devices", &collection).unwrap();

        let loaded: DeviceCollection = store.read("devices/saved_devices").unwrap();
        assert_eq!(loaded.devices.len(), 1);
        assert_eq!(loaded.devices[0].identifier, "abc");
    }

    #[test]
    fn test_write_replaces_whole_collection() {
        let (store, _temp) = setup();

        let mut collection = DeviceCollection::default();
        collection.devices.push(DeviceRecord {
            identifier: "one".to_string(),
            name: "One".to_string(),
        });
        collection.devices.push(DeviceRecord {
            identifier: "two".to_string(),
            name: "Two".to_string(),
        });
        store.write("devices/saved_devices", &collection).unwrap();

        collection.devices.truncate(1);
        store.write("devices/saved_devices", &collection).unwrap();

        let loaded: DeviceCollection = store.read("devices/saved_devices").unwrap();
        assert_eq!(loaded.devices.len(), 1);
    }

    #[test]
    fn test_nested_collection_creates_parent_directories() {
        let (store, temp) = setup();

        store
            .write("settings/settings", &DeviceCollection::default())
            .unwrap();

        assert!(temp.path().join("settings/settings.json").exists());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (store, temp) = setup();

        store
            .write("devices/saved_devices", &DeviceCollection::default())
            .unwrap();

        assert!(!temp.path().join("devices/saved_devices.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let (store, temp) = setup();

        std::fs::create_dir_all(temp.path().join("devices")).unwrap();
        std::fs::write(temp.path().join("devices/saved_devices.json"), b"not json").unwrap();

        let result: Result<DeviceCollection, StoreError> = store.read("devices/saved_devices");
        assert!(matches!(result, Err(StoreError::Serde(_))));
    }
}
