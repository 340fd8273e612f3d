use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::local_only;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Device-facing routes -- reachable from anywhere on the LAN
    let device_routes = Router::new()
        .route("/addDevice", post(handlers::add_device))
        .route("/connect", post(handlers::connect))
        .route(
            "/upload",
            post(handlers::upload)
                .layer(DefaultBodyLimit::max(state.config.content.max_upload_bytes)),
        );

    // Management routes -- owner only, rejected for other machines
    let management_routes = Router::new()
        .route("/devices", get(handlers::list_devices))
        .route("/refresh", post(handlers::refresh_announcement))
        .route("/removeDevice", post(handlers::remove_device))
        .route(
            "/settings",
            get(handlers::get_settings).post(handlers::update_settings),
        )
        .route("/verify", post(handlers::verify_device))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            local_only,
        ));

    Router::new()
        .merge(device_routes)
        .merge(management_routes)
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
