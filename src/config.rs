// Runtime configuration.
// Defaults match the public portfolio; a few knobs can be overridden from the environment.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

use crate::cache::DEFAULT_TTL;
use crate::error::{FolioError, Result};

/// GitHub account whose data the portfolio shows.
pub const ACCOUNT: &str = "SamiaLuvanice";

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const DEFAULT_USER_AGENT: &str = "folio";

#[derive(Debug, Clone)]
pub struct Config {
    pub account: String,
    pub api_base: String,
    pub user_agent: String,
    /// Optional token; unauthenticated requests work for public data.
    pub token: Option<String>,
    pub cache_ttl: Duration,
    /// Directory for persisted cache entries. `None` keeps the cache in memory.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: ACCOUNT.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token: None,
            cache_ttl: DEFAULT_TTL,
            cache_dir: default_cache_dir(),
        }
    }
}

impl Config {
    /// Build a config from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Recognised keys: `FOLIO_API_BASE`, `FOLIO_CACHE_DIR`, `FOLIO_CACHE_TTL_SECS`
    /// and `GITHUB_TOKEN`. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(base) = get("FOLIO_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(dir) = get("FOLIO_CACHE_DIR") {
            config.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = get("FOLIO_CACHE_TTL_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| FolioError::Other(format!("invalid FOLIO_CACHE_TTL_SECS: {secs}")))?;
            config.cache_ttl = Duration::from_secs(secs);
        }
        config.token = get("GITHUB_TOKEN");

        Ok(config)
    }
}

/// Platform cache directory (~/.cache/folio on Linux).
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "folio").map(|dirs| dirs.cache_dir().to_path_buf())
}
