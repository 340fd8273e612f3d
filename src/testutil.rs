//! Shared test helpers, available to all `#[cfg(test)]` modules in the crate.

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::config::{
    AdvertiseConfig, Config, ContentConfig, ServerConfig, StoreConfig, TokenConfig,
};
use crate::content::LocalSink;
use crate::devices::DeviceRegistry;
use crate::presence::Advertiser;
use crate::settings::SettingsStore;
use crate::store::models::{DeviceRecord, SessionToken};
use crate::store::FileStore;
use crate::tokens::TokenService;
use crate::AppState;

/// Open a fresh record store in a temporary directory.
///
/// Returns both the store and the `TempDir` guard; the caller must keep the
/// `TempDir` alive for the duration of the test.
pub fn setup_store() -> (Arc<FileStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(temp_dir.path()).unwrap());
    (store, temp_dir)
}

/// A minimal `Config` suitable for unit tests.
pub fn test_config() -> Config {
    Config {
        advertise: AdvertiseConfig::default(),
        content: ContentConfig::default(),
        server: ServerConfig {
            bind_address: "127.0.0.1:6789".to_string(),
        },
        store: StoreConfig {
            data_dir: "/tmp/test".to_string(),
        },
        tokens: TokenConfig::default(),
    }
}

/// Build a full `Arc<AppState>` around the given store.
///
/// The advertiser is left unstarted so tests never touch the network.
pub fn test_state(store: Arc<FileStore>) -> Arc<AppState> {
    let config = test_config();
    let advertiser = Advertiser::new(config.advertise.clone(), CancellationToken::new());
    let registry = DeviceRegistry::new(Arc::clone(&store));
    let settings = SettingsStore::new(Arc::clone(&store));
    let tokens = TokenService::new(Arc::clone(&store), config.tokens.ttl_seconds);

    Arc::new(AppState {
        advertiser,
        config,
        registry,
        settings,
        sink: Arc::new(LocalSink),
        tokens,
    })
}

/// Create a `DeviceRecord` with the given identifier.
pub fn make_device(identifier: &str) -> DeviceRecord {
    DeviceRecord {
        identifier: identifier.to_string(),
        name: format!("Phone {identifier}"),
    }
}

/// Create a live `SessionToken` for the given device.
pub fn make_token(device_id: &str, secret: &str) -> SessionToken {
    SessionToken {
        device_id: device_id.to_string(),
        expired_at: Utc::now() + chrono::Duration::minutes(1),
        secret: secret.to_string(),
    }
}
