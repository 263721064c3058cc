//! # sky-research
//!
//! AI research reports for individual records:
//!
//! - [`cache`]: session-lifetime `(tier, record)` cache with single-flight
//!   loading; failures are never cached
//! - [`citation`]: URL classification and narrative → HTML formatting with
//!   numbered references
//! - [`modal`]: the Closed / Loading / Shown / Error state machine that
//!   drives the cache and formats what it gets back

pub mod cache;
pub mod citation;
pub mod error;
pub mod modal;

pub use cache::ResearchCache;
pub use citation::{Citation, CitationProcessor, FormattedReport, UrlVerdict, classify};
pub use error::{ModalError, ResearchError};
pub use modal::{LoadOutcome, ModalState, ResearchLoad, ResearchModalController, ResearchView};
