use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inwave::{
    api,
    config::Config,
    content::LocalSink,
    devices::DeviceRegistry,
    presence::{self, Advertiser},
    settings::SettingsStore,
    store::FileStore,
    tokens::TokenService,
    AppState,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "inwave starting");

    // Load configuration
    let config = Config::load()?;

    // Open the record store
    let store = Arc::new(FileStore::open(&config.store.data_dir)?);
    info!("Record store opened at: {}", config.store.data_dir);

    let shutdown = CancellationToken::new();

    // Build components
    let advertiser = Advertiser::new(config.advertise.clone(), shutdown.clone());
    let registry = DeviceRegistry::new(Arc::clone(&store));
    let settings = SettingsStore::new(Arc::clone(&store));
    let tokens = TokenService::new(Arc::clone(&store), config.tokens.ttl_seconds);

    // Create shared state
    let state = Arc::new(AppState {
        advertiser,
        config: config.clone(),
        registry,
        settings,
        sink: Arc::new(LocalSink),
        tokens,
    });

    // Announce presence; a host that cannot announce at boot is useless
    state.advertiser.start().await?;

    // Start the background refresh cycle
    let cycle_handle = presence::start_refresh_cycle(Arc::clone(&state), shutdown.clone());

    // Build and start the HTTP server
    let app = api::create_router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
    .await?;

    // Stop the refresh cycle and withdraw the announcement
    shutdown.cancel();
    let cycle_result = cycle_handle.await;

    if let Err(e) = state.advertiser.stop().await {
        tracing::error!(error = %e, "Failed to withdraw announcement during shutdown");
    }

    info!("Shutdown complete");

    match cycle_result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(e.into()),
    }
}

/// Wait for SIGINT/SIGTERM, or for a fatal background error to cancel the
/// shutdown token.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
        _ = shutdown.cancelled() => {},
    }

    info!("Shutdown signal received, draining connections");
}
