//! inwave - LAN companion service for pairing phones with a desktop host
//!
//! This crate lets a paired mobile device discover the host machine, obtain a
//! short-lived credential, and push content to it:
//! - Device pairing with an owner-approved pending list
//! - Short-lived, single-use session tokens
//! - mDNS presence announcement with periodic refresh
//! - File, URL, and clipboard-text uploads behind Basic credentials
//! - Flat JSON record collections with atomic whole-file replace
//! - JSON management surface restricted to the host machine

pub mod api;
pub mod config;
pub mod content;
pub mod devices;
pub mod presence;
pub mod settings;
pub mod store;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use std::sync::Arc;

use config::Config;
use content::ContentSink;
use devices::DeviceRegistry;
use presence::Advertiser;
use settings::SettingsStore;
use tokens::TokenService;

/// Shared application state
pub struct AppState {
    pub advertiser: Advertiser,
    pub config: Config,
    pub registry: DeviceRegistry,
    pub settings: SettingsStore,
    pub sink: Arc<dyn ContentSink>,
    pub tokens: TokenService,
}
