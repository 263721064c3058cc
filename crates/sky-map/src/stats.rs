//! Aggregate display values over the current record list.

use std::fmt;

use serde::Serialize;
use sky_core::Record;

/// Shown for any value an empty or dateless list cannot provide.
pub const PLACEHOLDER: &str = "N/A";

/// Range of years covered by the records that carry a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub earliest: i32,
    pub latest: i32,
}

impl DateSpan {
    #[must_use]
    pub const fn is_single_year(&self) -> bool {
        self.earliest == self.latest
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_year() {
            write!(f, "{}", self.earliest)
        } else {
            write!(f, "{}\u{2013}{}", self.earliest, self.latest)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    /// Every record in the list.
    pub total: usize,
    /// Records with a valid position.
    pub visible: usize,
    /// Most frequent shape tag, lowercased; first seen wins ties.
    pub modal_shape: Option<String>,
    pub date_span: Option<DateSpan>,
}

impl StatsSummary {
    #[must_use]
    pub fn modal_shape_label(&self) -> &str {
        self.modal_shape.as_deref().unwrap_or(PLACEHOLDER)
    }

    #[must_use]
    pub fn date_span_label(&self) -> String {
        self.date_span
            .map_or_else(|| PLACEHOLDER.to_string(), |span| span.to_string())
    }
}

/// Summarize `records`. Never fails; an empty list yields zero counts and
/// placeholders.
#[must_use]
pub fn summarize(records: &[Record]) -> StatsSummary {
    let visible = records.iter().filter(|r| r.position().is_some()).count();

    StatsSummary {
        total: records.len(),
        visible,
        modal_shape: modal_shape(records),
        date_span: date_span(records),
    }
}

fn modal_shape(records: &[Record]) -> Option<String> {
    // Insertion order doubles as the tie-break order.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for shape in records
        .iter()
        .filter_map(|r| r.shape.as_deref())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    {
        match counts.iter_mut().find(|(name, _)| *name == shape) {
            Some((_, n)) => *n += 1,
            None => counts.push((shape, 1)),
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (shape, n) in counts {
        if best.as_ref().is_none_or(|(_, top)| n > *top) {
            best = Some((shape, n));
        }
    }
    best.map(|(shape, _)| shape)
}

fn date_span(records: &[Record]) -> Option<DateSpan> {
    let mut years = records.iter().filter_map(Record::year);
    let first = years.next()?;
    let (earliest, latest) = years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    Some(DateSpan { earliest, latest })
}
