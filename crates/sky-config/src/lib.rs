//! # sky-config
//!
//! Layered configuration loading for SkyWatch using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`SKYWATCH_*` prefix, `__` as separator)
//! 2. Project-level `.skywatch/config.toml`
//! 3. User-level `~/.config/skywatch/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `SKYWATCH_API__BASE_URL` -> `api.base_url`,
//! `SKYWATCH_MAP__HEAT_PROFILE` -> `map.heat_profile`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use sky_config::SkyConfig;
//!
//! let config = SkyConfig::load_with_dotenv().expect("config");
//! println!("API: {}", config.api.base_url);
//! ```

mod api;
mod auth;
mod error;
mod map;

pub use api::ApiConfig;
pub use auth::AuthConfig;
pub use error::ConfigError;
pub use map::MapConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use sky_core::filter::MAX_PAGE_SIZE;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SkyConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl SkyConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a source fails to parse or the merged
    /// values fail [`Self::validate`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration after reading `.env` from the working directory
    /// (or the nearest ancestor that has one).
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can merge extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".skywatch/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("SKYWATCH_").split("__"))
    }

    /// Cross-field checks figment cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero or oversized default
    /// page size, or a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let page_size = self.map.default_page_size;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "map.default_page_size".into(),
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Fail unless the API section is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] when `api.base_url` is blank.
    pub fn require_api(&self) -> Result<&ApiConfig, ConfigError> {
        if self.api.is_configured() {
            Ok(&self.api)
        } else {
            Err(ConfigError::NotConfigured {
                section: "api".into(),
            })
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("skywatch").join("config.toml"))
    }
}
