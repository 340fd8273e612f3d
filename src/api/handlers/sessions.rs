use axum::extract::{ConnectInfo, Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use super::DeviceForm;
use crate::api::response::DeviceMessage;
use crate::tokens::credentials;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// Reply to a successful connect. `s` carries the session secret,
/// base64-encoded once; the client decodes it before building its Basic
/// credential.
#[derive(Debug, Serialize)]
pub struct ConnectReply {
    pub message: String,
    pub s: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Device-facing connect: hand an approved device a fresh session secret.
pub async fn connect(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Form(form): Form<DeviceForm>,
) -> Response {
    if form.identifier.is_empty() || form.name.is_empty() {
        return DeviceMessage::response(StatusCode::BAD_REQUEST, "Identifier and name are required")
            .into_response();
    }

    let approved = match state.registry.is_approved(&form.identifier).await {
        Ok(approved) => approved,
        Err(e) => {
            tracing::error!(error = %e, "Failed to check device approval");
            return DeviceMessage::response(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
                .into_response();
        }
    };

    if !approved {
        return DeviceMessage::response(StatusCode::NOT_FOUND, "Device is not approved")
            .into_response();
    }

    let token = match state.tokens.issue(&form.identifier).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "Failed to issue session token");
            return DeviceMessage::response(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
                .into_response();
        }
    };

    tracing::info!(peer = %peer, identifier = %form.identifier, "Device connected");

    (
        StatusCode::OK,
        Json(ConnectReply {
            message: "I'm ready, let's connect!".to_string(),
            s: credentials::issued_form(&token.secret),
        }),
    )
        .into_response()
}
