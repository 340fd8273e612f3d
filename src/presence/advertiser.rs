use mdns_sd::{ServiceDaemon, ServiceInfo};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::AdvertiseConfig;

use super::host::HostIdentity;

#[derive(Debug, Error)]
pub enum AdvertiseError {
    #[error("no interface exposes a hardware address for the outbound route")]
    HardwareAddressNotFound,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Mac(#[from] mac_address::MacAddressError),
    #[error(transparent)]
    Mdns(#[from] mdns_sd::Error),
}

/// A live announcement: the daemon plus the instance it registered.
struct Announcement {
    daemon: ServiceDaemon,
    fullname: String,
}

#[derive(Default)]
struct AdvertiserState {
    announcement: Option<Announcement>,
    identity: Option<HostIdentity>,
}

/// Announces the service over mDNS and keeps the announcement fresh.
///
/// `start`, `refresh`, and `stop` serialize on one mutex, so overlapping
/// refreshes run back-to-back and always end with a live announcement.
pub struct Advertiser {
    cancel: CancellationToken,
    config: AdvertiseConfig,
    state: Mutex<AdvertiserState>,
}

impl Advertiser {
    pub fn new(config: AdvertiseConfig, cancel: CancellationToken) -> Self {
        Self {
            cancel,
            config,
            state: Mutex::new(AdvertiserState::default()),
        }
    }

    /// Resolve the host identity and announce the service.
    pub async fn start(&self) -> Result<(), AdvertiseError> {
        let mut state = self.state.lock().await;

        let identity = HostIdentity::resolve()?;
        info!(
            host = %identity.host_name,
            ip = %identity.ip_addr,
            interface = %identity.interface,
            mac = %identity.hardware_address,
            "Resolved host identity"
        );

        state.announcement = Some(self.announce(&identity)?);
        state.identity = Some(identity);
        Ok(())
    }

    /// Re-resolve the identity and restart the announcement.
    ///
    /// The current announcement is always withdrawn; the cached identity is
    /// replaced only when the address actually changed. The settle delay
    /// between withdraw and re-announce lets peers drop the old record, and
    /// is cut short by shutdown.
    pub async fn refresh(&self) -> Result<(), AdvertiseError> {
        let mut state = self.state.lock().await;

        let resolved = HostIdentity::resolve()?;
        let previous_ip = state.identity.as_ref().map(|i| i.ip_addr);
        if previous_ip != Some(resolved.ip_addr) {
            info!(old_ip = ?previous_ip, new_ip = %resolved.ip_addr, "Host address changed");
            state.identity = Some(resolved);
        }

        if let Some(announcement) = state.announcement.take() {
            withdraw(announcement)?;
        }

        tokio::select! {
            _ = self.cancel.cancelled() => return Ok(()),
            _ = tokio::time::sleep(self.config.settle_delay) => {}
        }

        let identity = state.identity.clone();
        if let Some(identity) = identity {
            state.announcement = Some(self.announce(&identity)?);
            debug!("Announcement refreshed");
        }
        Ok(())
    }

    /// Withdraw the announcement if one is live. Idempotent.
    pub async fn stop(&self) -> Result<(), AdvertiseError> {
        let mut state = self.state.lock().await;
        if let Some(announcement) = state.announcement.take() {
            withdraw(announcement)?;
            info!("Announcement withdrawn");
        }
        Ok(())
    }

    /// Identity cached by the last start or refresh.
    pub async fn current_identity(&self) -> Option<HostIdentity> {
        self.state.lock().await.identity.clone()
    }

    fn announce(&self, identity: &HostIdentity) -> Result<Announcement, AdvertiseError> {
        let daemon = ServiceDaemon::new()?;
        let service = ServiceInfo::new(
            &self.config.service_type,
            &identity.instance_name(),
            &format!("{}.local.", identity.host_name),
            identity.ip_addr,
            self.config.port,
            None::<std::collections::HashMap<String, String>>,
        )?;
        let fullname = service.get_fullname().to_string();
        daemon.register(service)?;

        info!(instance = %fullname, port = self.config.port, "Service announced");
        Ok(Announcement { daemon, fullname })
    }
}

fn withdraw(announcement: Announcement) -> Result<(), AdvertiseError> {
    announcement.daemon.unregister(&announcement.fullname)?;
    announcement.daemon.shutdown()?;
    Ok(())
}
