use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::DeviceMessage;
use crate::content::UploadedFile;
use crate::tokens::credentials::{self, CredentialError};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Default)]
struct UploadParts {
    files: Vec<UploadedFile>,
    text: Option<String>,
    url: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Device-facing upload: authenticate, then hand each piece to the sink.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    // The body is not touched until the credential checks out
    let credential = headers
        .get(AUTHORIZATION)
        .ok_or(CredentialError::Missing)
        .and_then(|value| value.to_str().map_err(|_| CredentialError::Encoding))
        .and_then(credentials::parse_basic);

    let (device_id, secret) = match credential {
        Ok(parsed) => parsed,
        Err(e) => {
            return DeviceMessage::response(StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    };

    match state.tokens.authenticate(&device_id, &secret).await {
        Ok(true) => {}
        Ok(false) => {
            return DeviceMessage::response(StatusCode::UNAUTHORIZED, "Invalid token")
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to verify session token");
            return DeviceMessage::response(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
                .into_response();
        }
    }

    let parts = match read_parts(multipart).await {
        Ok(parts) => parts,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected malformed upload body");
            return DeviceMessage::response(StatusCode::BAD_REQUEST, "Malformed upload body")
                .into_response();
        }
    };

    let settings = match state.settings.load().await {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load settings");
            return DeviceMessage::response(StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
                .into_response();
        }
    };

    if let Some(url) = parts.url {
        if let Err(e) = state.sink.deliver_url(&url).await {
            tracing::error!(error = %e, "URL delivery failed");
            return DeviceMessage::response(StatusCode::INTERNAL_SERVER_ERROR, "Delivery failed")
                .into_response();
        }
    }

    if let Some(text) = parts.text {
        if let Err(e) = state.sink.deliver_text(&text).await {
            tracing::error!(error = %e, "Text delivery failed");
            return DeviceMessage::response(StatusCode::INTERNAL_SERVER_ERROR, "Delivery failed")
                .into_response();
        }
    }

    if !parts.files.is_empty() {
        match state
            .sink
            .deliver_files(&settings.destination, parts.files)
            .await
        {
            Ok(count) => {
                tracing::info!(files = count, device_id = %device_id, "Stored uploaded files")
            }
            Err(e) => {
                tracing::error!(error = %e, "File delivery failed");
                return DeviceMessage::response(StatusCode::INTERNAL_SERVER_ERROR, "Delivery failed")
                    .into_response();
            }
        }
    }

    DeviceMessage::response(StatusCode::OK, "Received all content successfully").into_response()
}

// ============================================================================
// Helpers
// ============================================================================

/// Walk the multipart fields. A field carrying a file name is an upload
/// whatever it is called; bare `url` and `text` fields carry the other push
/// kinds, and empty values count as absent.
async fn read_parts(mut multipart: Multipart) -> Result<UploadParts, MultipartError> {
    let mut parts = UploadParts::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string());
        let file_name = field.file_name().map(|s| s.to_string());

        if let Some(name) = file_name {
            let data = field.bytes().await?.to_vec();
            parts.files.push(UploadedFile { data, name });
            continue;
        }

        match field_name.as_deref() {
            Some("url") => {
                let value = field.text().await?;
                if !value.is_empty() {
                    parts.url = Some(value);
                }
            }
            Some("text") => {
                let value = field.text().await?;
                if !value.is_empty() {
                    parts.text = Some(value);
                }
            }
            _ => {}
        }
    }

    Ok(parts)
}
