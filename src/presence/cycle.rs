use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::AppState;

use super::advertiser::AdvertiseError;

/// Start the background announcement refresh task.
///
/// The task sleeps for the configured interval, refreshes the announcement,
/// and repeats. A refresh failure cancels the shutdown token: the service
/// must not keep running while undiscoverable.
pub fn start_refresh_cycle(
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> JoinHandle<Result<(), AdvertiseError>> {
    let interval = state.config.advertise.refresh_interval;

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = tokio::time::sleep(interval) => {}
            }

            debug!("Refreshing announcement");
            if let Err(e) = state.advertiser.refresh().await {
                error!(error = %e, "Announcement refresh failed");
                shutdown.cancel();
                return Err(e);
            }
        }
    })
}
