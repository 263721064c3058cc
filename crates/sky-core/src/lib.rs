//! # sky-core
//!
//! Core types shared across all SkyWatch crates.
//!
//! - [`record`]: incident records as returned by the record query, with
//!   lenient timestamp parsing and validated geographic positions
//! - [`filter`]: the filter predicate and its query-string encoding
//! - [`region`]: per-region counts used to populate selectors
//! - [`research`]: quick/full research results and upstream citations
//! - [`enums`]: small closed enumerations (tiers, shape classes, render modes)
//! - [`errors`]: cross-cutting error types

pub mod enums;
pub mod errors;
pub mod filter;
pub mod record;
pub mod region;
pub mod research;

pub use enums::{HeatProfile, PopupDetail, RenderMode, ResearchTier, ShapeClass};
pub use errors::CoreError;
pub use filter::FilterPredicate;
pub use record::{GeoPoint, Record, RecordId};
pub use region::RegionSummary;
pub use research::{ResearchResult, SourceCitation};
