//! Application configuration.
//!
//! Settings are read from `<config_dir>/cartoonspoon/config.toml` when that
//! file exists; every field has a default. `TMDB_API_KEY` and
//! `DRIVE_ACCESS_TOKEN` in the environment override the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::drive::load_access_token;
use crate::error::{Error, Result};

/// Environment variable overriding [`TmdbConfig::api_key`].
pub const TMDB_API_KEY_ENV: &str = "TMDB_API_KEY";

/// Environment variable overriding [`DriveConfig::access_token`].
pub const DRIVE_ACCESS_TOKEN_ENV: &str = "DRIVE_ACCESS_TOKEN";

/// Metadata catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key; without one titles are left unresolved.
    pub api_key: Option<String>,
    /// Response language.
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "en-US".to_string(),
        }
    }
}

/// Google Drive settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Bearer token used as-is when set.
    pub access_token: Option<String>,
    /// Authorized-user token JSON read when no token is set directly.
    pub token_file: PathBuf,
    /// Whether to remove a partially written file when a fetch fails.
    pub cleanup_on_error: bool,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            token_file: PathBuf::from("login_files/token.json"),
            cleanup_on_error: true,
        }
    }
}

/// Link discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Root URL of the site searched for Drive links.
    pub base_url: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://kayoanime.com".to_string(),
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory title folders are created under.
    pub download_dir: PathBuf,
    /// Metadata catalog settings.
    pub tmdb: TmdbConfig,
    /// Google Drive settings.
    pub drive: DriveConfig,
    /// Link discovery settings.
    pub search: SearchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("downloads"),
            tmdb: TmdbConfig::default(),
            drive: DriveConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl AppConfig {
    /// Creates a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default location of the config file.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cartoonspoon")
            .join("config.toml")
    }

    /// Parses a TOML document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document is not valid TOML for this
    /// schema.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Loads the config file at `path` (or the default location), falling
    /// back to defaults when it does not exist, then applies environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map_or_else(Self::default_path, Path::to_path_buf);
        let config = if path.exists() {
            log::debug!("Loading config from {}", path.display());
            Self::from_toml_str(&std::fs::read_to_string(&path)?)?
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Self::default()
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Applies overrides looked up through `var`.
    #[must_use]
    pub fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = var(TMDB_API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.tmdb.api_key = Some(key);
        }
        if let Some(token) = var(DRIVE_ACCESS_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.drive.access_token = Some(token);
        }
        self
    }

    /// Sets the download directory.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Sets the TMDB API key.
    #[must_use]
    pub fn with_tmdb_api_key(mut self, key: impl Into<String>) -> Self {
        self.tmdb.api_key = Some(key.into());
        self
    }

    /// Sets the Drive access token.
    #[must_use]
    pub fn with_drive_access_token(mut self, token: impl Into<String>) -> Self {
        self.drive.access_token = Some(token.into());
        self
    }

    /// Returns the Drive bearer token, reading the token file if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if no token is configured and the token file is
    /// missing or has no token.
    pub fn drive_access_token(&self) -> Result<String> {
        match &self.drive.access_token {
            Some(token) => Ok(token.clone()),
            None => load_access_token(&self.drive.token_file),
        }
    }
}
