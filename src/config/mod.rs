//! Environment and settings for `lf-cli`.
//!
//! Credentials come from the process environment, optionally seeded from a
//! `.env` file in the working directory. The base URL and request timeout
//! can be overridden for self-hosted or slow deployments.

use crate::error::{LfError, Result};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default LoadForge API root.
pub const DEFAULT_BASE_URL: &str = "https://app.loadforge.com/api/v2";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "API_KEY";

/// Environment variable overriding the API base URL.
pub const ENV_BASE_URL: &str = "LOADFORGE_BASE_URL";

/// Environment variable overriding the request timeout (seconds).
pub const ENV_TIMEOUT_SECS: &str = "LOADFORGE_TIMEOUT_SECS";

/// Load `.env` from the working directory into the process environment.
///
/// Existing environment variables win over `.env` entries. A missing or
/// unreadable file is not an error.
pub fn load_env() {
    let env_path = Path::new(".env");
    let loaded = if env_path.exists() {
        dotenvy::from_path(env_path).is_ok()
    } else {
        dotenvy::dotenv().is_ok()
    };
    debug!(loaded, "dotenv processed");
}

/// Resolved client settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Settings {
    /// Build settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `LfError::MissingApiKey` when `API_KEY` is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Split out from
    /// `from_env` so tests never mutate process-global state.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(LfError::MissingApiKey)?;

        let base_url = lookup(ENV_BASE_URL)
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = lookup(ENV_TIMEOUT_SECS)
            .and_then(|t| t.trim().parse::<u64>().ok())
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
