//! Map pipeline error types.

use sky_client::ClientError;
use sky_core::CoreError;

/// Failure to obtain a record list or region index.
///
/// Recovered by the session: the last successful render stays on screen
/// and a dismissible notice is raised.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure or non-2xx status from the API.
    #[error("fetch failed: {0}")]
    Client(#[from] ClientError),

    /// The predicate was rejected before any request was sent.
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] CoreError),
}

impl FetchError {
    /// Message for the transient notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(e) => e.user_message(),
            Self::InvalidFilter(e) => e.to_string(),
        }
    }
}
