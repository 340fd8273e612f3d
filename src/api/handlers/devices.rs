use axum::extract::{ConnectInfo, Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;

use super::{store_error, DeviceForm};
use crate::api::response::{ApiError, AppJson, DeviceMessage, JSend};
use crate::devices::RegistryError;
use crate::store::models::DeviceRecord;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub accept: bool,
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub identifier: String,
}

#[derive(Debug, Serialize)]
pub struct DeviceListResponse {
    pub approved: Vec<DeviceEntry>,
    pub pending: Vec<DeviceEntry>,
}

#[derive(Debug, Serialize)]
pub struct DeviceEntry {
    pub identifier: String,
    pub name: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Device-facing registration. The mobile client keys on the exact reply
/// strings, so errors are mapped here instead of bubbling as ApiError.
pub async fn add_device(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Form(form): Form<DeviceForm>,
) -> Response {
    if form.identifier.is_empty() || form.name.is_empty() {
        return DeviceMessage::response(StatusCode::BAD_REQUEST, "Identifier and name are required")
            .into_response();
    }

    let identifier = form.identifier.clone();
    let device = DeviceRecord {
        identifier: form.identifier,
        name: form.name,
    };

    match state.registry.register_pending(device).await {
        Ok(()) => {
            tracing::info!(peer = %peer, identifier = %identifier, "Device requested registration");
            DeviceMessage::response(
                StatusCode::OK,
                "Added your device to the pending list. Waiting for device verification...",
            )
            .into_response()
        }
        Err(RegistryError::AlreadyApproved) => {
            DeviceMessage::response(StatusCode::BAD_REQUEST, "Already connected!").into_response()
        }
        Err(RegistryError::Store(e)) => {
            tracing::error!(error = %e, "Failed to queue device registration");
            DeviceMessage::response(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
                .into_response()
        }
    }
}

pub async fn list_devices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<DeviceListResponse>>, ApiError> {
    let (pending, approved) = state.registry.snapshot().await.map_err(store_error)?;

    Ok(JSend::success(DeviceListResponse {
        approved: approved.into_iter().map(device_entry).collect(),
        pending: pending.into_iter().map(device_entry).collect(),
    }))
}

pub async fn verify_device(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<VerifyRequest>,
) -> Result<Json<JSend<()>>, ApiError> {
    if req.identifier.trim().is_empty() {
        return Err(ApiError::bad_request("identifier is required"));
    }

    state
        .registry
        .decide(&req.identifier, req.accept)
        .await
        .map_err(store_error)?;

    tracing::info!(identifier = %req.identifier, accept = req.accept, "Device verification decided");
    Ok(JSend::success(()))
}

pub async fn remove_device(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<RemoveRequest>,
) -> Result<Json<JSend<()>>, ApiError> {
    if req.identifier.trim().is_empty() {
        return Err(ApiError::bad_request("identifier is required"));
    }

    state
        .registry
        .remove(&req.identifier)
        .await
        .map_err(store_error)?;

    tracing::info!(identifier = %req.identifier, "Device removed");
    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

fn device_entry(record: DeviceRecord) -> DeviceEntry {
    DeviceEntry {
        identifier: record.identifier,
        name: record.name,
    }
}
