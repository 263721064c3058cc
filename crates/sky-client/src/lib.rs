//! # sky-client
//!
//! HTTP client for the SkyWatch API. The core only consumes four endpoints:
//! - record query (`GET {records_path}?format=simple&...`)
//! - region index (`GET {regions_path}`)
//! - quick research (`GET {quick_research_path}/{id}`)
//! - full research (`GET {full_research_path}/{id}`)
//!
//! plus the research status probe. Every request carries `X-API-Key` when a
//! key is configured.
//!
//! The map and research layers never see [`SkyClient`] directly; they are
//! generic over the [`RecordSource`], [`RegionSource`], and
//! [`ResearchSource`] traits so they can be driven by in-memory fakes.

pub mod records;
pub mod regions;
pub mod research;

mod error;
mod http;

pub use error::ClientError;
pub use research::ResearchStatus;

use std::future::Future;
use std::time::Duration;

use sky_config::ApiConfig;
use sky_core::{FilterPredicate, Record, RecordId, RegionSummary, ResearchResult, ResearchTier};

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

// ── Seams ──────────────────────────────────────────────────────────

/// Anything that can answer a record query.
pub trait RecordSource: Send + Sync {
    /// Fetch the records matching `predicate`. No client-side filtering.
    fn fetch_records(
        &self,
        predicate: &FilterPredicate,
    ) -> impl Future<Output = Result<Vec<Record>, ClientError>> + Send;
}

/// Anything that can list per-region counts.
pub trait RegionSource: Send + Sync {
    fn fetch_regions(&self) -> impl Future<Output = Result<Vec<RegionSummary>, ClientError>> + Send;
}

/// Anything that can produce research narratives.
pub trait ResearchSource: Send + Sync {
    fn fetch_research(
        &self,
        tier: ResearchTier,
        record_id: &RecordId,
    ) -> impl Future<Output = Result<ResearchResult, ClientError>> + Send;
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the SkyWatch API.
#[derive(Clone)]
pub struct SkyClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl SkyClient {
    /// Build a client from the API configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// fails to build (e.g. TLS backend initialization).
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("skywatch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Replace the API key, e.g. after prompting the user for one.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.config.api_key = api_key.into();
    }

    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `GET url` with the API key header attached when configured.
    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        tracing::debug!(url, "GET");
        let request = self.http.get(url);
        if self.config.has_api_key() {
            request.header(API_KEY_HEADER, &self.config.api_key)
        } else {
            request
        }
    }
}

impl RecordSource for SkyClient {
    async fn fetch_records(&self, predicate: &FilterPredicate) -> Result<Vec<Record>, ClientError> {
        self.query_records(predicate).await
    }
}

impl RegionSource for SkyClient {
    async fn fetch_regions(&self) -> Result<Vec<RegionSummary>, ClientError> {
        self.query_regions().await
    }
}

impl ResearchSource for SkyClient {
    async fn fetch_research(
        &self,
        tier: ResearchTier,
        record_id: &RecordId,
    ) -> Result<ResearchResult, ClientError> {
        match tier {
            ResearchTier::Quick => self.quick_research(record_id).await,
            ResearchTier::Full => self.full_research(record_id).await,
        }
    }
}
