//! Configuration loading.
//!
//! Read from `<config dir>/smelter/config.toml`; a missing file means
//! defaults. The backend base URL resolves in precedence order:
//! `SMELTER_BASE_URL` env var, then `[backend] base_url`, then the built-in
//! default.
//!
//! ```toml
//! [backend]
//! base_url = "http://analysis.internal:8080/api"
//!
//! [log]
//! filter = "smelter_session=debug,info"
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;

use smelter_gateway::DEFAULT_BASE_URL;

const BASE_URL_ENV: &str = "SMELTER_BASE_URL";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub backend: Option<BackendConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackendConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    /// Default tracing filter; `RUST_LOG` still takes precedence.
    pub filter: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Load from the default location; absent file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The backend base URL after applying the env override.
    #[must_use]
    pub fn base_url(&self) -> String {
        if let Ok(value) = env::var(BASE_URL_ENV)
            && !value.trim().is_empty()
        {
            return value;
        }
        self.backend
            .as_ref()
            .and_then(|backend| backend.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.log.as_ref().and_then(|log| log.filter.as_deref())
    }
}

/// `<config dir>/smelter/config.toml`, if a config dir exists on this
/// platform.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("smelter").join("config.toml"))
}
