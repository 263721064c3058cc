//! Record fetching with out-of-order protection.
//!
//! Every request takes a sequence number when it is issued. When a response
//! settles, the fetcher records the highest sequence settled so far; a
//! response older than that is reported as [`FetchOutcome::Stale`] and must
//! not replace what is on screen. In-flight requests are never cancelled.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use sky_client::RecordSource;
use sky_core::{FilterPredicate, Record};

use crate::error::FetchError;

/// What normalization changed in a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Records dropped because an earlier one had the same id.
    pub duplicates: usize,
    /// Records whose coordinates were cleared as half-present or out of range.
    pub cleared_positions: usize,
}

/// A batch that is newer than anything applied before it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedBatch {
    pub sequence: u64,
    pub records: Vec<Record>,
    pub report: NormalizeReport,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fresh(FetchedBatch),
    /// A newer request settled first; this response was discarded.
    Stale { sequence: u64 },
}

impl FetchOutcome {
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

pub struct RecordFetcher<S> {
    source: S,
    issued: AtomicU64,
    settled: AtomicU64,
}

impl<S: RecordSource> RecordFetcher<S> {
    pub const fn new(source: S) -> Self {
        Self {
            source,
            issued: AtomicU64::new(0),
            settled: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Sequence number of the most recently issued request.
    #[must_use]
    pub fn last_issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Query upstream for `predicate` and normalize the result.
    ///
    /// All predicate evaluation happens upstream; the returned records are
    /// exactly what the service sent, minus duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidFilter`] before any request if the
    /// predicate is invalid, or [`FetchError::Client`] if the newest request
    /// failed. Failures of superseded requests surface as
    /// [`FetchOutcome::Stale`].
    pub async fn fetch(&self, predicate: &FilterPredicate) -> Result<FetchOutcome, FetchError> {
        predicate.validate()?;
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(sequence, query = %predicate.to_query_string(), "fetching records");

        let result = self.source.fetch_records(predicate).await;

        let newest = self.settled.fetch_max(sequence, Ordering::SeqCst);
        if newest > sequence {
            tracing::debug!(sequence, newest, "discarding out-of-order response");
            return Ok(FetchOutcome::Stale { sequence });
        }

        let (records, report) = normalize(result?);
        tracing::info!(sequence, count = records.len(), "records fetched");
        Ok(FetchOutcome::Fresh(FetchedBatch {
            sequence,
            records,
            report,
        }))
    }
}

/// Drop repeated ids (first wins) and clear invalid coordinates.
#[must_use]
pub fn normalize(records: Vec<Record>) -> (Vec<Record>, NormalizeReport) {
    let mut seen = HashSet::with_capacity(records.len());
    let mut report = NormalizeReport::default();
    let mut out = Vec::with_capacity(records.len());

    for mut record in records {
        if !seen.insert(record.id.clone()) {
            report.duplicates += 1;
            continue;
        }
        if record.normalize_position() {
            report.cleared_positions += 1;
        }
        out.push(record);
    }

    if report.duplicates > 0 {
        tracing::warn!(count = report.duplicates, "dropped records with duplicate ids");
    }
    if report.cleared_positions > 0 {
        tracing::warn!(
            count = report.cleared_positions,
            "cleared invalid coordinates"
        );
    }
    (out, report)
}
