use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A paired (or pairing) device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Client-chosen unique identifier
    pub identifier: String,
    /// Human-readable display name
    pub name: String,
}

/// File and wire shape of a device collection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceCollection {
    pub devices: Vec<DeviceRecord>,
}

/// A short-lived session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// Identifier of the device the token was issued to
    pub device_id: String,
    /// When the token stops being valid
    pub expired_at: DateTime<Utc>,
    /// Opaque secret (32-byte hex), compared verbatim at authentication
    pub secret: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenCollection {
    pub tokens: Vec<SessionToken>,
}

/// Persisted service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory uploaded files are written to
    pub destination: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            destination: "./received".to_string(),
        }
    }
}
