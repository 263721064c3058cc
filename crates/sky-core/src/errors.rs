//! Cross-cutting error types for SkyWatch.
//!
//! Transport and rendering errors live in their own crates (`ClientError`,
//! `FetchError`, `ResearchError`). This module only covers failures that
//! can be detected on plain values.

use thiserror::Error;

/// Errors raised while validating or parsing core values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Data failed validation (ordering, ranges, empty values).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A string did not name a known variant of a closed enumeration.
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}
