mod content;
mod devices;
mod sessions;
mod system;

use serde::Deserialize;

use crate::api::response::ApiError;
use crate::store::StoreError;

/// Shared form body of the device-facing registration and connect routes.
#[derive(Debug, Deserialize)]
pub struct DeviceForm {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub name: String,
}

pub use content::upload;
pub use devices::{add_device, list_devices, remove_device, verify_device};
pub use sessions::connect;
pub use system::{get_settings, health, refresh_announcement, update_settings};

/// Map a StoreError onto the management surface's unavailable reply
fn store_error(e: StoreError) -> ApiError {
    ApiError::unavailable(format!("Storage unavailable: {e}"))
}
