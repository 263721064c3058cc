//! Upstream HTTP service configuration.

use serde::{Deserialize, Serialize};

fn default_base_url() -> String {
    String::from("http://localhost:8000")
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_records_path() -> String {
    String::from("/v1/map/data")
}

fn default_regions_path() -> String {
    String::from("/v1/map/states")
}

fn default_quick_research_path() -> String {
    String::from("/v1/research/quick")
}

fn default_full_research_path() -> String {
    String::from("/v1/research/sighting")
}

fn default_research_status_path() -> String {
    String::from("/v1/research/status")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Scheme + host (+ optional port) of the SkyWatch API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `X-API-Key` on every request when non-empty.
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_records_path")]
    pub records_path: String,

    #[serde(default = "default_regions_path")]
    pub regions_path: String,

    /// Prefix; the record id is appended as the last path segment.
    #[serde(default = "default_quick_research_path")]
    pub quick_research_path: String,

    /// Prefix; the record id is appended as the last path segment.
    #[serde(default = "default_full_research_path")]
    pub full_research_path: String,

    #[serde(default = "default_research_status_path")]
    pub research_status_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            records_path: default_records_path(),
            regions_path: default_regions_path(),
            quick_research_path: default_quick_research_path(),
            full_research_path: default_full_research_path(),
            research_status_path: default_research_status_path(),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Join `base_url` and a path without doubling or dropping the slash.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
