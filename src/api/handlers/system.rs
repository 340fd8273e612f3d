use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::store_error;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::settings::SettingsError;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub destination: String,
    pub host_name: Option<String>,
    pub ip_addr: Option<String>,
    /// `"<host_name> <ip>"`, the payload the devices page renders as a QR
    /// code for first contact
    pub qr_payload: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub destination: String,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<SettingsResponse>>, ApiError> {
    let settings = state.settings.load().await.map_err(store_error)?;
    let identity = state.advertiser.current_identity().await;

    let qr_payload = identity
        .as_ref()
        .map(|i| format!("{} {}", i.host_name, i.ip_addr));

    Ok(JSend::success(SettingsResponse {
        destination: settings.destination,
        host_name: identity.as_ref().map(|i| i.host_name.clone()),
        ip_addr: identity.as_ref().map(|i| i.ip_addr.to_string()),
        qr_payload,
    }))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<UpdateSettingsRequest>,
) -> Result<Json<JSend<()>>, ApiError> {
    if req.destination.trim().is_empty() {
        return Err(ApiError::bad_request("destination is required"));
    }

    match state.settings.set_destination(&req.destination).await {
        Ok(()) => Ok(JSend::success(())),
        Err(SettingsError::DestinationMissing) => {
            Err(ApiError::not_found("Destination directory does not exist"))
        }
        Err(SettingsError::DestinationInvalid(reason)) => Err(ApiError::bad_request(format!(
            "Destination is not usable: {reason}"
        ))),
        Err(SettingsError::Store(e)) => Err(store_error(e)),
    }
}

/// Operator-triggered announcement refresh, the same path the background
/// cycle takes on its interval.
pub async fn refresh_announcement(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<()>>, ApiError> {
    state
        .advertiser
        .refresh()
        .await
        .map_err(|e| ApiError::internal(format!("Announcement refresh failed: {e}")))?;

    Ok(JSend::success(()))
}
