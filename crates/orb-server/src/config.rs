//! Configuration management

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::features::cleanup::AssetFieldMap;
use crate::storage::config::StoreConfig;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Any origin may call the webhook and upload endpoints unless narrowed.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "*";

/// Upper bound on concurrent store deletes for one notification.
pub const DEFAULT_CLEANUP_CONCURRENCY: usize = 4;

/// Root folder every upload lands under.
pub const DEFAULT_MEDIA_FOLDER_ROOT: &str = "orbfood";

/// Folder used when an upload does not name one.
pub const DEFAULT_UPLOAD_FOLDER: &str = "general";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub cleanup: CleanupConfig,
    pub media: MediaConfig,
    pub store: StoreConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Cleanup webhook configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Record kinds managed by the cleanup webhook and their asset fields
    pub field_map: AssetFieldMap,
    /// Maximum store deletes in flight for a single notification
    pub concurrency: usize,
}

/// Upload gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub folder_root: String,
}

impl Config {
    /// Load configuration from `.env`, the environment, and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Build configuration from the current process environment
    pub fn from_env() -> anyhow::Result<Self> {
        let field_map = match std::env::var("CLEANUP_FIELD_MAP") {
            Ok(raw) => AssetFieldMap::from_str(&raw)?,
            Err(_) => AssetFieldMap::default(),
        };

        let config = Config {
            server: ServerConfig {
                host: std::env::var("ORB_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: env_parse("ORB_PORT").unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parse("ORB_SHUTDOWN_TIMEOUT")
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS").unwrap_or(false),
            },
            cleanup: CleanupConfig {
                field_map,
                concurrency: env_parse("CLEANUP_CONCURRENCY").unwrap_or(DEFAULT_CLEANUP_CONCURRENCY),
            },
            media: MediaConfig {
                folder_root: std::env::var("MEDIA_FOLDER_ROOT")
                    .unwrap_or_else(|_| DEFAULT_MEDIA_FOLDER_ROOT.to_string()),
            },
            store: StoreConfig::from_env(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if self.cleanup.concurrency == 0 {
            anyhow::bail!("Cleanup concurrency must be at least 1");
        }

        if self.cleanup.field_map.is_empty() {
            tracing::warn!("Cleanup field map is empty - every notification will be a no-op");
        }

        if self.store.timeout_secs == 0 {
            anyhow::bail!("Store timeout must be at least 1 second");
        }

        if self.store.delivery_marker.trim().is_empty() {
            anyhow::bail!("Store delivery marker cannot be empty");
        }

        if !self.store.has_credentials() {
            tracing::warn!(
                "Store credentials are not configured - cleanup and upload calls will fail"
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: false,
            },
            cleanup: CleanupConfig {
                field_map: AssetFieldMap::default(),
                concurrency: DEFAULT_CLEANUP_CONCURRENCY,
            },
            media: MediaConfig {
                folder_root: DEFAULT_MEDIA_FOLDER_ROOT.to_string(),
            },
            store: StoreConfig::default(),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
