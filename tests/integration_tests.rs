//! End-to-end integration tests

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tempfile::TempDir;

use inwave::devices::{DeviceRegistry, RegistryError};
use inwave::store::collections;
use inwave::store::models::DeviceRecord;
use inwave::store::FileStore;
use inwave::tokens::TokenService;

fn setup_store() -> (Arc<FileStore>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileStore::open(temp_dir.path()).unwrap());
    (store, temp_dir)
}

fn make_device(identifier: &str) -> DeviceRecord {
    DeviceRecord {
        identifier: identifier.to_string(),
        name: format!("Phone {identifier}"),
    }
}

#[tokio::test]
async fn test_registration_approval_flow() {
    let (store, _temp) = setup_store();
    let registry = DeviceRegistry::new(Arc::clone(&store));
    let tokens = TokenService::new(Arc::clone(&store), 300);

    // Device asks to register
    registry
        .register_pending(make_device("phone-1"))
        .await
        .unwrap();
    assert!(!registry.is_approved("phone-1").await.unwrap());

    // Owner approves it
    registry.decide("phone-1", true).await.unwrap();
    assert!(registry.is_approved("phone-1").await.unwrap());

    // Device connects and uses its token once
    let token = tokens.issue("phone-1").await.unwrap();
    assert!(tokens.authenticate("phone-1", &token.secret).await.unwrap());

    // The token is single use
    assert!(!tokens.authenticate("phone-1", &token.secret).await.unwrap());
}

#[tokio::test]
async fn test_registration_rejection_flow() {
    let (store, _temp) = setup_store();
    let registry = DeviceRegistry::new(store);

    // Device asks to register, owner rejects
    registry
        .register_pending(make_device("phone-1"))
        .await
        .unwrap();
    registry.decide("phone-1", false).await.unwrap();

    assert!(!registry.is_approved("phone-1").await.unwrap());
    let (pending, approved) = registry.snapshot().await.unwrap();
    assert!(pending.is_empty());
    assert!(approved.is_empty());

    // A rejected device may ask again
    registry
        .register_pending(make_device("phone-1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_approved_device_cannot_reregister() {
    let (store, _temp) = setup_store();
    let registry = DeviceRegistry::new(store);

    registry
        .register_pending(make_device("phone-1"))
        .await
        .unwrap();
    registry.decide("phone-1", true).await.unwrap();

    // Approved identifiers never re-enter the pending list
    let result = registry.register_pending(make_device("phone-1")).await;
    assert!(matches!(result, Err(RegistryError::AlreadyApproved)));

    let (pending, approved) = registry.snapshot().await.unwrap();
    assert!(pending.is_empty());
    assert_eq!(approved.len(), 1);
}

#[tokio::test]
async fn test_decide_and_remove_are_idempotent() {
    let (store, _temp) = setup_store();
    let registry = DeviceRegistry::new(store);

    // Deciding an identifier that never asked is a quiet no-op
    registry.decide("ghost", true).await.unwrap();
    let (pending, approved) = registry.snapshot().await.unwrap();
    assert!(pending.is_empty());
    assert!(approved.is_empty());

    registry
        .register_pending(make_device("phone-1"))
        .await
        .unwrap();
    registry.decide("phone-1", true).await.unwrap();

    // Removing twice is as good as removing once
    registry.remove("phone-1").await.unwrap();
    registry.remove("phone-1").await.unwrap();
    assert!(!registry.is_approved("phone-1").await.unwrap());
}

#[tokio::test]
async fn test_multiple_live_tokens_per_device() {
    let (store, _temp) = setup_store();
    let tokens = TokenService::new(store, 300);

    let first = tokens.issue("phone-1").await.unwrap();
    let second = tokens.issue("phone-1").await.unwrap();
    assert_ne!(first.secret, second.secret);

    // Consuming one leaves the other live
    assert!(tokens.authenticate("phone-1", &second.secret).await.unwrap());
    assert!(tokens.authenticate("phone-1", &first.secret).await.unwrap());
}

#[tokio::test]
async fn test_racing_authenticates_single_winner() {
    let (store, _temp) = setup_store();
    let tokens = Arc::new(TokenService::new(store, 300));
    let secret = tokens.issue("phone-1").await.unwrap().secret;

    let a = {
        let tokens = Arc::clone(&tokens);
        let secret = secret.clone();
        tokio::spawn(async move { tokens.authenticate("phone-1", &secret).await.unwrap() })
    };
    let b = {
        let tokens = Arc::clone(&tokens);
        let secret = secret.clone();
        tokio::spawn(async move { tokens.authenticate("phone-1", &secret).await.unwrap() })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert!(a ^ b, "exactly one authenticate must win");
}

#[tokio::test]
async fn test_parallel_registrations_preserved() {
    let (store, _temp) = setup_store();
    let registry = Arc::new(DeviceRegistry::new(store));

    let mut handles = Vec::new();
    for i in 0..5 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .register_pending(make_device(&format!("phone-{i}")))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // No registration was lost to a concurrent read-modify-write
    let (pending, _) = registry.snapshot().await.unwrap();
    assert_eq!(pending.len(), 5);
}

#[tokio::test]
async fn test_collections_keep_original_wire_shape() {
    let (store, temp) = setup_store();
    let registry = DeviceRegistry::new(store);

    registry
        .register_pending(make_device("phone-1"))
        .await
        .unwrap();
    registry.decide("phone-1", true).await.unwrap();

    // The on-disk file is the approved collection under its historical name
    let raw = std::fs::read_to_string(
        temp.path()
            .join(format!("{}.json", collections::APPROVED_DEVICES)),
    )
    .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed["devices"][0]["identifier"], "phone-1");
    assert_eq!(parsed["devices"][0]["name"], "Phone phone-1");
}

#[tokio::test]
async fn test_credential_round_trip() {
    let (store, _temp) = setup_store();
    let tokens = TokenService::new(store, 300);
    let token = tokens.issue("phone-1").await.unwrap();

    // The connect reply carries the secret base64-encoded once
    let wire = inwave::tokens::credentials::issued_form(&token.secret);

    // The client decodes it and embeds the raw secret in its Basic payload
    let decoded = String::from_utf8(STANDARD.decode(&wire).unwrap()).unwrap();
    let header = format!("Basic {}", STANDARD.encode(format!("phone-1:{decoded}")));

    let (device_id, presented) = inwave::tokens::credentials::parse_basic(&header).unwrap();
    assert!(tokens.authenticate(&device_id, &presented).await.unwrap());
}
