//! # sky-map
//!
//! The client-side map pipeline: filter predicate → record fetch → markers
//! or density surface, plus the aggregate stats shown beside the map.
//!
//! The pure decision layer (clustering, heat rasterization, stats) has no
//! knowledge of how anything is drawn. Drawing goes through the
//! [`MapSurface`] trait, and network access through the
//! [`sky_client::RecordSource`] and [`sky_client::RegionSource`] traits.
//! [`MapSession`] ties the pieces together for one user session.

pub mod cluster;
pub mod error;
pub mod fetcher;
pub mod filter_state;
pub mod geo;
pub mod heat;
pub mod marker;
pub mod renderer;
pub mod session;
pub mod state_index;
pub mod stats;

pub use cluster::{Cluster, ClusterLayer};
pub use error::FetchError;
pub use fetcher::{FetchOutcome, RecordFetcher};
pub use filter_state::FilterState;
pub use geo::GeoBounds;
pub use heat::{HeatLayer, HeatTuning};
pub use marker::{Marker, Popup};
pub use renderer::{LayerKind, MapRenderer, MapSurface, RenderReport, RendererConfig};
pub use session::{MapSession, Notice, Refresh};
pub use state_index::{RegionOption, StateIndex};
pub use stats::{StatsSummary, summarize};
