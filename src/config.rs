use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub advertise: AdvertiseConfig,
    pub content: ContentConfig,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub tokens: TokenConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct AdvertiseConfig {
    /// Port carried in the mDNS record, not the HTTP bind port
    pub port: u16,
    pub refresh_interval: Duration,
    pub service_type: String,
    pub settle_delay: Duration,
}

impl Default for AdvertiseConfig {
    fn default() -> Self {
        Self {
            port: 9876,
            refresh_interval: Duration::from_secs(600), // 10 minutes
            service_type: "_iw._tcp.local.".to_string(),
            settle_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentConfig {
    pub max_upload_bytes: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 50 << 20, // 50 MiB
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub ttl_seconds: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { ttl_seconds: 300 }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:6789".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./configs".to_string());

        let advertise_port = std::env::var("ADVERTISE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(9876);

        let refresh_interval = std::env::var("REFRESH_INTERVAL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| AdvertiseConfig::default().refresh_interval);

        let ttl_seconds = std::env::var("TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300);

        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(50 << 20);

        let config = Config {
            advertise: AdvertiseConfig {
                port: advertise_port,
                refresh_interval,
                ..Default::default()
            },
            content: ContentConfig { max_upload_bytes },
            server: ServerConfig { bind_address },
            store: StoreConfig { data_dir },
            tokens: TokenConfig { ttl_seconds },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.is_empty() {
            return Err(ConfigError::ValidationError(
                "BIND_ADDRESS cannot be empty".to_string(),
            ));
        }

        if self.tokens.ttl_seconds <= 0 {
            return Err(ConfigError::ValidationError(
                "TOKEN_TTL_SECONDS must be positive".to_string(),
            ));
        }

        if self.advertise.refresh_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "REFRESH_INTERVAL_SECONDS must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
