//! Configuration loaded from the user config directory.

use std::{
    env, fs,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;

const CONFIG_DIR: &str = "framecache";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable consulted when the config file carries no token.
pub const TOKEN_ENV: &str = "FIGMA_API_KEY";

/// Top-level configuration loaded from `<config dir>/framecache/config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from `explicit`, or from the default location.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error. The API token falls back to `FIGMA_API_KEY`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env_token(env::var(TOKEN_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration file location for this platform.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    fn apply_env_token(&mut self, token: Option<String>) {
        if self.api.token.is_none() {
            self.api.token = token.filter(|t| !t.trim().is_empty());
        }
    }

    fn validate(&self) -> Result<()> {
        self.cache.capacity()?;
        if self.api.base_url.trim().is_empty() {
            bail!("api.base_url must not be empty");
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

/// Remote design API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API, without trailing slash.
    pub base_url: String,
    /// Personal access token or OAuth token.
    pub token: Option<String>,
    /// Send the token as an OAuth bearer token instead of `X-Figma-Token`.
    pub oauth: bool,
    /// Global timeout for a single request, in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.figma.com/v1".into(),
            token: None,
            oauth: false,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Token, or an error naming where to configure it.
    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("no API token configured; set api.token or {TOKEN_ENV}"))
    }
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    capacity: usize,
    /// Check the origin's modification marker before serving a cached hit.
    pub validate_freshness: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            validate_freshness: true,
        }
    }
}

impl CacheConfig {
    /// Construct cache settings explicitly.
    pub const fn new(capacity: usize, validate_freshness: bool) -> Self {
        Self {
            capacity,
            validate_freshness,
        }
    }

    /// Configured capacity; zero is rejected.
    pub fn capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity).ok_or_else(|| anyhow!("cache.capacity must be greater than zero"))
    }
}
