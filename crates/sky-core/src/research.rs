//! Research results returned by the AI-report service.

use serde::{Deserialize, Serialize};

use crate::enums::ResearchTier;

/// A citation supplied by the upstream service alongside a full report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCitation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
}

/// Narrative produced for one record at one tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum ResearchResult {
    /// Short narrative text only.
    Quick { narrative: String },
    /// Long narrative plus any citations the service attached.
    Full {
        narrative: String,
        #[serde(default)]
        citations: Vec<SourceCitation>,
    },
}

impl ResearchResult {
    #[must_use]
    pub const fn tier(&self) -> ResearchTier {
        match self {
            Self::Quick { .. } => ResearchTier::Quick,
            Self::Full { .. } => ResearchTier::Full,
        }
    }

    #[must_use]
    pub fn narrative(&self) -> &str {
        match self {
            Self::Quick { narrative } | Self::Full { narrative, .. } => narrative,
        }
    }

    /// Upstream citations; always empty for quick results.
    #[must_use]
    pub fn citations(&self) -> &[SourceCitation] {
        match self {
            Self::Quick { .. } => &[],
            Self::Full { citations, .. } => citations,
        }
    }
}
