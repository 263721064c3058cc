//! Research modal state machine.
//!
//! ```text
//! Closed ──open──▶ Loading(quick) ──settle──▶ Shown(quick) ──request_full──▶ Loading(full)
//!                        │                                                     │
//!                        └──────────────▶ Error ◀────────────── settle ────────┘
//! any state ──close──▶ Closed
//! ```
//!
//! Transitions that start a load return a [`ResearchLoad`] ticket. The
//! caller runs it (inline or on a spawned task) and hands the
//! [`LoadOutcome`] back to [`ResearchModalController::settle`]. Every
//! `open`, `request_full` and `close` bumps a generation counter; an outcome
//! from an older generation is dropped without touching the view. The load
//! itself still completes and fills the cache.

use std::sync::Arc;

use sky_client::ResearchSource;
use sky_core::{RecordId, ResearchResult, ResearchTier};

use crate::cache::ResearchCache;
use crate::citation::{CitationProcessor, FormattedReport};
use crate::error::{ModalError, ResearchError};

/// A report ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchView {
    pub result: ResearchResult,
    pub formatted: FormattedReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Loading {
        record_id: RecordId,
        tier: ResearchTier,
    },
    Shown {
        record_id: RecordId,
        tier: ResearchTier,
        view: ResearchView,
    },
    Error {
        record_id: RecordId,
        tier: ResearchTier,
        message: String,
    },
}

impl ModalState {
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    #[must_use]
    pub const fn record_id(&self) -> Option<&RecordId> {
        match self {
            Self::Closed => None,
            Self::Loading { record_id, .. }
            | Self::Shown { record_id, .. }
            | Self::Error { record_id, .. } => Some(record_id),
        }
    }
}

/// A pending load handed out by the controller.
#[must_use = "a load does nothing until it is run and settled"]
pub struct ResearchLoad<S> {
    generation: u64,
    tier: ResearchTier,
    record_id: RecordId,
    cache: Arc<ResearchCache>,
    source: Arc<S>,
}

impl<S: ResearchSource> ResearchLoad<S> {
    #[must_use]
    pub const fn tier(&self) -> ResearchTier {
        self.tier
    }

    #[must_use]
    pub const fn record_id(&self) -> &RecordId {
        &self.record_id
    }

    /// Fetch through the cache.
    pub async fn run(self) -> LoadOutcome {
        let result = self
            .cache
            .load(self.source.as_ref(), self.tier, &self.record_id)
            .await;
        LoadOutcome {
            generation: self.generation,
            tier: self.tier,
            record_id: self.record_id,
            result,
        }
    }
}

/// The settled result of a [`ResearchLoad`].
#[derive(Debug)]
pub struct LoadOutcome {
    generation: u64,
    tier: ResearchTier,
    record_id: RecordId,
    result: Result<ResearchResult, ResearchError>,
}

pub struct ResearchModalController<S> {
    source: Arc<S>,
    cache: Arc<ResearchCache>,
    processor: CitationProcessor,
    state: ModalState,
    generation: u64,
}

impl<S: ResearchSource> ResearchModalController<S> {
    pub fn new(source: Arc<S>, cache: Arc<ResearchCache>) -> Self {
        Self {
            source,
            cache,
            processor: CitationProcessor::new(),
            state: ModalState::Closed,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ModalState {
        &self.state
    }

    #[must_use]
    pub fn cache(&self) -> &ResearchCache {
        &self.cache
    }

    /// Show the quick report for `record_id`, replacing whatever was open.
    pub fn open(&mut self, record_id: RecordId) -> ResearchLoad<S> {
        self.begin(record_id, ResearchTier::Quick)
    }

    /// Upgrade the shown quick report to the full one.
    ///
    /// # Errors
    ///
    /// Returns [`ModalError::FullWithoutQuick`] unless a quick report is
    /// currently shown.
    pub fn request_full(&mut self) -> Result<ResearchLoad<S>, ModalError> {
        match &self.state {
            ModalState::Shown {
                record_id,
                tier: ResearchTier::Quick,
                ..
            } => {
                let record_id = record_id.clone();
                Ok(self.begin(record_id, ResearchTier::Full))
            }
            _ => Err(ModalError::FullWithoutQuick),
        }
    }

    /// Close from any state. In-flight loads keep running.
    pub fn close(&mut self) {
        self.generation += 1;
        self.state = ModalState::Closed;
    }

    /// Apply a finished load. Returns `false` if it was superseded.
    pub fn settle(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                id = %outcome.record_id,
                tier = %outcome.tier,
                "ignoring superseded research result"
            );
            return false;
        }

        self.state = match outcome.result {
            Ok(result) => {
                let formatted = match &result {
                    ResearchResult::Quick { narrative } => self.processor.format(narrative),
                    ResearchResult::Full {
                        narrative,
                        citations,
                    } => self.processor.format_with_sources(narrative, citations),
                };
                ModalState::Shown {
                    record_id: outcome.record_id,
                    tier: outcome.tier,
                    view: ResearchView { result, formatted },
                }
            }
            Err(e) => {
                tracing::warn!(id = %outcome.record_id, tier = %outcome.tier, error = %e, "research failed");
                ModalState::Error {
                    record_id: outcome.record_id,
                    tier: outcome.tier,
                    message: e.user_message(),
                }
            }
        };
        true
    }

    /// Open and wait for the quick report.
    pub async fn open_and_wait(&mut self, record_id: RecordId) -> &ModalState {
        let load = self.open(record_id);
        let outcome = load.run().await;
        self.settle(outcome);
        &self.state
    }

    /// Request the full report and wait for it.
    ///
    /// # Errors
    ///
    /// See [`Self::request_full`].
    pub async fn request_full_and_wait(&mut self) -> Result<&ModalState, ModalError> {
        let load = self.request_full()?;
        let outcome = load.run().await;
        self.settle(outcome);
        Ok(&self.state)
    }

    fn begin(&mut self, record_id: RecordId, tier: ResearchTier) -> ResearchLoad<S> {
        self.generation += 1;
        self.state = ModalState::Loading {
            record_id: record_id.clone(),
            tier,
        };
        ResearchLoad {
            generation: self.generation,
            tier,
            record_id,
            cache: Arc::clone(&self.cache),
            source: Arc::clone(&self.source),
        }
    }
}
