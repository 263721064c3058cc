//! Research error types.

use sky_client::ClientError;
use sky_core::ResearchTier;

/// A research endpoint call failed. Never cached: the next request for the
/// same key goes back to the network.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("research request failed: {0}")]
    Client(#[from] ClientError),

    /// The service answered with a result of the wrong tier.
    #[error("expected a {expected} report, got {actual}")]
    TierMismatch {
        expected: ResearchTier,
        actual: ResearchTier,
    },
}

impl ResearchError {
    /// Message for the modal's error view.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            Self::TierMismatch { .. } => "unexpected response from the service".to_string(),
        }
    }
}

/// A modal transition that is not valid from the current state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModalError {
    /// A full report was requested while no quick report is shown.
    #[error("the research modal is not showing a quick report")]
    FullWithoutQuick,
}
