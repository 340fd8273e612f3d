//! Logical collection names, resolved to `<data_dir>/<name>.json` by the store.

/// Approved devices: `{"devices": [...]}`
pub const APPROVED_DEVICES: &str = "devices/saved_devices";

/// Pending devices awaiting an operator decision: `{"devices": [...]}`
pub const PENDING_DEVICES: &str = "devices/requested_devices";

/// Live session tokens: `{"tokens": [...]}`
pub const TOKENS: &str = "devices/tokens";

/// Service settings: `{"destination": ...}`
pub const SETTINGS: &str = "settings/settings";
