use orb_common::asset::DEFAULT_STORE_MARKER;
use serde::{Deserialize, Serialize};
use std::{env, fmt};

pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub api_base: String,
    pub cloud_name: Option<String>,
    pub api_key: Option<String>,
    #[serde(skip_serializing)]
    pub api_secret: Option<String>,
    /// Substring identifying delivery URLs served by the store
    pub delivery_marker: String,
    /// Upper bound for a single store call
    pub timeout_secs: u64,
}

/// Complete credential set; only exists when all three values are present.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        Self {
            api_base: env::var("CLOUDINARY_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            cloud_name: non_empty_var("CLOUDINARY_CLOUD_NAME"),
            api_key: non_empty_var("CLOUDINARY_API_KEY"),
            api_secret: non_empty_var("CLOUDINARY_API_SECRET"),
            delivery_marker: env::var("CLOUDINARY_DELIVERY_MARKER")
                .unwrap_or_else(|_| DEFAULT_STORE_MARKER.to_string()),
            timeout_secs: env::var("CLOUDINARY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Configuration pointing at a local mock of the store API.
    pub fn for_endpoint(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            cloud_name: Some("orbfood".to_string()),
            api_key: Some("test-key".to_string()),
            api_secret: Some("test-secret".to_string()),
            ..Self::default()
        }
    }

    pub fn credentials(&self) -> Option<StoreCredentials> {
        Some(StoreCredentials {
            cloud_name: self.cloud_name.clone()?,
            api_key: self.api_key.clone()?,
            api_secret: self.api_secret.clone()?,
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name: None,
            api_key: None,
            api_secret: None,
            delivery_marker: DEFAULT_STORE_MARKER.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("api_base", &self.api_base)
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("delivery_marker", &self.delivery_marker)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
