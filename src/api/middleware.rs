//! Local-only access control
//!
//! The management surface is meant for the owner sitting at the machine,
//! not for devices on the LAN. Requests pass only from loopback or from the
//! host's own address.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use crate::api::response::ApiError;
use crate::AppState;

/// Middleware that rejects management requests from other machines.
///
/// The host's own LAN address counts as local so a browser pointed at the
/// advertised address still reaches the management pages from the same
/// machine.
pub async fn local_only(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let peer_ip = peer.ip();

    let allowed = peer_ip.is_loopback()
        || state
            .advertiser
            .current_identity()
            .await
            .is_some_and(|identity| identity.ip_addr == peer_ip);

    if !allowed {
        debug!(peer = %peer_ip, "Rejected non-local management request");
        return ApiError::forbidden("Management endpoints are local-only").into_response();
    }

    next.run(request).await
}
