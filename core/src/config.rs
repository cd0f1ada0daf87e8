//! Store configuration loading
//!
//! Loads configuration from `~/.config/homeinspect/config.toml` (or the file
//! named by `HOMEINSPECT_CONFIG`). A missing file yields defaults. Backend URL
//! and credentials can be overridden with `HOMEINSPECT_BASE_URL`,
//! `HOMEINSPECT_USERNAME` and `HOMEINSPECT_PASSWORD`.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use homeinspect_backend_client::DEFAULT_BASE_URL;
use homeinspect_protocol::wire::Credentials;
use serde::Deserialize;

use crate::error::Result;
use crate::error::StoreError;

#[derive(Clone, Deserialize)]
pub struct InspectConfig {
    /// API root, e.g. `http://host/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Upper bound for a single backend request.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound for waiting on bootstrap.
    #[serde(default = "default_bootstrap_timeout_secs")]
    pub bootstrap_timeout_secs: u64,

    /// Buffered events per subscriber before the slowest one lags.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_bootstrap_timeout_secs() -> u64 {
    30
}

fn default_event_capacity() -> usize {
    64
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: String::new(),
            password: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            bootstrap_timeout_secs: default_bootstrap_timeout_secs(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl std::fmt::Debug for InspectConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InspectConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("bootstrap_timeout_secs", &self.bootstrap_timeout_secs)
            .field("event_capacity", &self.event_capacity)
            .finish()
    }
}

impl InspectConfig {
    pub const ENV_CONFIG_PATH: &'static str = "HOMEINSPECT_CONFIG";
    pub const ENV_BASE_URL: &'static str = "HOMEINSPECT_BASE_URL";
    pub const ENV_USERNAME: &'static str = "HOMEINSPECT_USERNAME";
    pub const ENV_PASSWORD: &'static str = "HOMEINSPECT_PASSWORD";
    const DEFAULT_CONFIG_FILENAME: &'static str = "config.toml";

    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path();

        let mut cfg = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            tracing::info!(
                path = %path.display(),
                "config not found, using defaults"
            );
            Self::default()
        };

        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StoreError::config_with_source(
                format!("failed to read config at {}", path.display()),
                e,
            )
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: InspectConfig = toml::from_str(contents)
            .map_err(|e| StoreError::config_with_source("failed to parse config", e))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Overlay values from `lookup` (normally the process environment).
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(Self::ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(user) = lookup(Self::ENV_USERNAME) {
            self.username = user;
        }
        if let Some(pass) = lookup(Self::ENV_PASSWORD) {
            self.password = pass;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(StoreError::config("base_url must not be empty"));
        }
        if self.request_timeout_secs == 0 {
            return Err(StoreError::config("request_timeout_secs must be > 0"));
        }
        if self.bootstrap_timeout_secs == 0 {
            return Err(StoreError::config("bootstrap_timeout_secs must be > 0"));
        }
        if self.event_capacity == 0 {
            return Err(StoreError::config("event_capacity must be > 0"));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.username.clone(), self.password.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_secs(self.bootstrap_timeout_secs)
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }

        dirs::home_dir()
            .map(|h| {
                h.join(".config")
                    .join("homeinspect")
                    .join(Self::DEFAULT_CONFIG_FILENAME)
            })
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILENAME))
    }
}
