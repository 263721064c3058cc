//! Session-cached per-region counts for selector population.

use serde::Serialize;
use sky_client::RegionSource;
use sky_core::RegionSummary;
use tokio::sync::OnceCell;

use crate::error::FetchError;

/// One entry of a region selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionOption {
    pub code: String,
    pub label: String,
}

/// Loaded once per session, then served from memory. A failed load is not
/// remembered, so the next call tries again.
pub struct StateIndex<S> {
    source: S,
    regions: OnceCell<Vec<RegionSummary>>,
}

impl<S: RegionSource> StateIndex<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            regions: OnceCell::const_new(),
        }
    }

    /// Regions sorted by display name.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the first load fails.
    pub async fn regions(&self) -> Result<&[RegionSummary], FetchError> {
        let regions = self
            .regions
            .get_or_try_init(|| async {
                let mut regions = self.source.fetch_regions().await?;
                regions.retain(|r| !r.code.trim().is_empty());
                regions.sort_by(|a, b| {
                    a.display_name()
                        .to_lowercase()
                        .cmp(&b.display_name().to_lowercase())
                        .then_with(|| a.code.cmp(&b.code))
                });
                tracing::debug!(count = regions.len(), "region index loaded");
                Ok::<_, FetchError>(regions)
            })
            .await?;
        Ok(regions)
    }

    /// Selector entries: code plus `"Name (count)"` label.
    ///
    /// # Errors
    ///
    /// See [`Self::regions`].
    pub async fn options(&self) -> Result<Vec<RegionOption>, FetchError> {
        Ok(self
            .regions()
            .await?
            .iter()
            .map(|r| RegionOption {
                code: r.code.clone(),
                label: r.label(),
            })
            .collect())
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.regions.initialized()
    }
}
