//! The record filter predicate.
//!
//! A predicate is a set of optional constraints; an absent field matches
//! everything. Evaluation happens upstream, so the only things this module
//! does are validation and query-string encoding.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Largest page size the record query accepts.
pub const MAX_PAGE_SIZE: u32 = 10_000;

/// Optional constraints on the record query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub shape: Option<String>,
    /// Region (state/province) code.
    #[serde(default)]
    pub region: Option<String>,
    /// Case-insensitive city substring.
    #[serde(default)]
    pub city: Option<String>,
    /// Provenance source tag.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl FilterPredicate {
    /// A predicate with no constraints.
    #[must_use]
    pub fn match_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    #[must_use]
    pub fn with_shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    #[must_use]
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Check the predicate's own invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if `date_from` is after `date_to`
    /// or the page size is zero or above [`MAX_PAGE_SIZE`].
    pub fn validate(&self) -> Result<(), CoreError> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(CoreError::Validation(format!(
                    "date_from {from} is after date_to {to}"
                )));
            }
        }
        if let Some(size) = self.page_size {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(CoreError::Validation(format!(
                    "page_size must be between 1 and {MAX_PAGE_SIZE}, got {size}"
                )));
            }
        }
        Ok(())
    }

    /// True if no field constrains the query.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Query parameters for the set fields, in a fixed order.
    ///
    /// Text fields are trimmed and dropped when empty; the region code is
    /// upper-cased to match how upstream stores it.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(from) = self.date_from {
            pairs.push(("date_from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.date_to {
            pairs.push(("date_to", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(shape) = non_empty(self.shape.as_deref()) {
            pairs.push(("shape", shape.to_string()));
        }
        if let Some(region) = non_empty(self.region.as_deref()) {
            pairs.push(("state", region.to_ascii_uppercase()));
        }
        if let Some(city) = non_empty(self.city.as_deref()) {
            pairs.push(("city", city.to_string()));
        }
        if let Some(source) = non_empty(self.source.as_deref()) {
            pairs.push(("source", source.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("limit", size.to_string()));
        }
        pairs
    }

    /// Percent-encoded `key=value&...` string (no leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.query_pairs()
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
