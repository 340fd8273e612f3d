use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use crate::store::collections;
use crate::store::models::{SessionToken, TokenCollection};
use crate::store::{FileStore, StoreError};

use super::generator;

/// Issues and verifies single-use session tokens for approved devices.
///
/// Tokens live in one flat collection on disk. Every verification pass
/// rewrites the collection when it drops anything, so a crash never
/// resurrects a consumed secret.
pub struct TokenService {
    lock: Mutex<()>,
    store: Arc<FileStore>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(store: Arc<FileStore>, ttl_seconds: i64) -> Self {
        Self {
            lock: Mutex::new(()),
            store,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Mint a fresh token for the device and persist it alongside any
    /// tokens already outstanding.
    pub async fn issue(&self, device_id: &str) -> Result<SessionToken, StoreError> {
        let token = SessionToken {
            device_id: device_id.to_string(),
            expired_at: Utc::now() + self.ttl,
            secret: generator::generate_secret(),
        };

        let _guard = self.lock.lock().await;
        let mut collection: TokenCollection = self.store.read(collections::TOKENS)?;
        collection.tokens.push(token.clone());
        self.store.write(collections::TOKENS, &collection)?;

        tracing::debug!(device_id = %device_id, "Issued session token");
        Ok(token)
    }

    /// Check presented credentials against the stored tokens.
    ///
    /// The pass consumes the matching token and sweeps expired ones in the
    /// same rewrite. A token whose secret matches the presented one is
    /// dropped even when its device identifier does not, so a leaked secret
    /// cannot be retried against other identifiers.
    pub async fn authenticate(&self, device_id: &str, secret: &str) -> Result<bool, StoreError> {
        let now = Utc::now();

        let _guard = self.lock.lock().await;
        let mut collection: TokenCollection = self.store.read(collections::TOKENS)?;
        let before = collection.tokens.len();

        let mut ok = false;
        collection.tokens.retain(|token| {
            if token.device_id == device_id && token.secret == secret && now < token.expired_at {
                ok = true;
            }
            now < token.expired_at && token.secret != secret
        });

        if collection.tokens.len() != before {
            self.store.write(collections::TOKENS, &collection)?;
        }

        tracing::debug!(device_id = %device_id, ok, "Verified session token");
        Ok(ok)
    }
}
