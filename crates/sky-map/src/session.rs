//! The map session: one context object tying filter, fetch, render and
//! stats together.
//!
//! Everything the map view mutates lives here and is threaded through the
//! caller explicitly. Record lists are replaced wholesale on each fetch and
//! the stats are re-derived from the new list.

use serde::Serialize;
use sky_client::{RecordSource, RegionSource};
use sky_config::MapConfig;
use sky_core::{FilterPredicate, Record, RenderMode};

use crate::error::FetchError;
use crate::fetcher::{FetchOutcome, RecordFetcher};
use crate::filter_state::FilterState;
use crate::renderer::{MapRenderer, MapSurface, RenderReport, RendererConfig};
use crate::state_index::{RegionOption, StateIndex};
use crate::stats::{StatsSummary, summarize};

/// Dismissible message raised when a fetch fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
}

/// Result of a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// New records were drawn.
    Rendered(RenderReport),
    /// A newer response already landed; nothing changed.
    Superseded,
    /// The fetch failed; the previous render is untouched and a notice is up.
    Failed,
}

pub struct MapSession<R, G, S> {
    filters: FilterState,
    fetcher: RecordFetcher<R>,
    regions: StateIndex<G>,
    renderer: MapRenderer<S>,
    records: Vec<Record>,
    stats: StatsSummary,
    notice: Option<Notice>,
}

impl<R, G, S> MapSession<R, G, S>
where
    R: RecordSource,
    G: RegionSource,
    S: MapSurface,
{
    pub fn new(records: R, regions: G, surface: S, config: &MapConfig) -> Self {
        Self {
            filters: FilterState::new(config.default_page_size),
            fetcher: RecordFetcher::new(records),
            regions: StateIndex::new(regions),
            renderer: MapRenderer::new(surface, RendererConfig::from(config)),
            records: Vec::new(),
            stats: summarize(&[]),
            notice: None,
        }
    }

    /// Adopt `predicate` and fetch. An invalid predicate raises a notice
    /// without sending anything.
    pub async fn apply_filters(&mut self, predicate: FilterPredicate) -> Refresh {
        if let Err(e) = self.filters.apply(predicate) {
            self.raise(&FetchError::from(e));
            return Refresh::Failed;
        }
        self.refresh().await
    }

    /// Reset to the unconstrained predicate and fetch.
    pub async fn clear_filters(&mut self) -> Refresh {
        self.filters.clear();
        self.refresh().await
    }

    /// Fetch the current predicate and redraw on success.
    pub async fn refresh(&mut self) -> Refresh {
        match self.fetcher.fetch(self.filters.predicate()).await {
            Ok(FetchOutcome::Fresh(batch)) => {
                self.records = batch.records;
                self.stats = summarize(&self.records);
                self.notice = None;
                Refresh::Rendered(self.renderer.render(&self.records))
            }
            Ok(FetchOutcome::Stale { .. }) => Refresh::Superseded,
            Err(e) => {
                self.raise(&e);
                Refresh::Failed
            }
        }
    }

    /// Switch presentation without re-fetching.
    pub fn set_mode(&mut self, mode: RenderMode) -> RenderReport {
        self.renderer.set_mode(mode, &self.records)
    }

    pub fn toggle_mode(&mut self) -> RenderReport {
        self.set_mode(self.renderer.mode().toggled())
    }

    /// Re-cluster after the surface zoom changed.
    pub fn on_zoom_changed(&mut self) {
        self.renderer.on_zoom_changed();
    }

    /// Selector entries for the region control. A failure raises a notice
    /// and yields no options.
    pub async fn region_options(&mut self) -> Vec<RegionOption> {
        match self.regions.options().await {
            Ok(options) => options,
            Err(e) => {
                self.raise(&e);
                Vec::new()
            }
        }
    }

    #[must_use]
    pub const fn filters(&self) -> &FilterState {
        &self.filters
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub const fn stats(&self) -> &StatsSummary {
        &self.stats
    }

    #[must_use]
    pub const fn renderer(&self) -> &MapRenderer<S> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut MapRenderer<S> {
        &mut self.renderer
    }

    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn raise(&mut self, error: &FetchError) {
        tracing::warn!(error = %error, "map fetch failed");
        self.notice = Some(Notice {
            message: error.user_message(),
        });
    }
}
