//! Incident records.
//!
//! The wire format follows the upstream "simple" map response. Every field
//! except `id` may be missing or `null`; such fields are treated as unset.
//! Timestamps and coordinates are parsed leniently: an unparseable or
//! wrongly typed value is treated as absent rather than failing the record.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::enums::ShapeClass;

/// Opaque, stable record identifier.
///
/// Upstream ids are integers, but nothing in SkyWatch does arithmetic on
/// them, so both numbers and strings are accepted and kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<i32> for RecordId {
    fn from(id: i32) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

/// A validated geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    /// Build a point, returning `None` when either coordinate is non-finite
    /// or outside `-90..=90` / `-180..=180`.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }
}

/// One incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,

    /// When the incident happened.
    #[serde(default, rename = "date_time", deserialize_with = "lenient_timestamp")]
    pub occurred_at: Option<NaiveDateTime>,

    #[serde(default, deserialize_with = "nullable_string")]
    pub summary: String,

    /// Full free-text narrative.
    #[serde(default, deserialize_with = "nullable_string")]
    pub text: String,

    #[serde(default)]
    pub shape: Option<String>,

    #[serde(default, deserialize_with = "nullable_string")]
    pub duration: String,

    #[serde(default, deserialize_with = "nullable_string")]
    pub city: String,

    /// Region (state/province) code.
    #[serde(default, rename = "state")]
    pub region: Option<String>,

    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,

    /// Provenance tag (e.g. `nuforc`).
    #[serde(default)]
    pub source: Option<String>,

    /// When the report was posted.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub posted: Option<NaiveDateTime>,
}

impl Record {
    /// Create a record with only an id; everything else unset.
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            occurred_at: None,
            summary: String::new(),
            text: String::new(),
            shape: None,
            duration: String::new(),
            city: String::new(),
            region: None,
            latitude: None,
            longitude: None,
            source: None,
            posted: None,
        }
    }

    /// The record's position, if both coordinates are present and valid.
    #[must_use]
    pub fn position(&self) -> Option<GeoPoint> {
        GeoPoint::new(self.latitude?, self.longitude?)
    }

    /// Drop a half-present or out-of-range coordinate pair so that the
    /// record is consistently position-less. Returns `true` if anything
    /// was cleared.
    pub fn normalize_position(&mut self) -> bool {
        let had_any = self.latitude.is_some() || self.longitude.is_some();
        if had_any && self.position().is_none() {
            self.latitude = None;
            self.longitude = None;
            return true;
        }
        false
    }

    #[must_use]
    pub fn shape_class(&self) -> ShapeClass {
        ShapeClass::from_shape(self.shape.as_deref())
    }

    /// Year the incident happened, if the timestamp is known.
    #[must_use]
    pub fn year(&self) -> Option<i32> {
        self.occurred_at.map(|ts| ts.year())
    }

    /// `"City, RG"`, or whichever half is known.
    #[must_use]
    pub fn location_label(&self) -> String {
        let city = self.city.trim();
        match self.region.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            Some(region) if !city.is_empty() => format!("{city}, {region}"),
            Some(region) => region.to_string(),
            None => city.to_string(),
        }
    }

    // Builder helpers, mostly for fixtures.

    #[must_use]
    pub fn with_position(mut self, lat: f64, lng: f64) -> Self {
        self.latitude = Some(lat);
        self.longitude = Some(lng);
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
        self.city = city.into();
        self
    }

    #[must_use]
    pub const fn with_occurred_at(mut self, ts: NaiveDateTime) -> Self {
        self.occurred_at = Some(ts);
        self
    }

    #[must_use]
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }
}

/// Parse an upstream timestamp.
///
/// Accepts RFC 3339 (offset is converted to UTC), naive ISO-8601 with `T` or
/// space separator and optional fractional seconds, and bare `YYYY-MM-DD`
/// dates (midnight). Anything else yields `None`.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDateTime>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(raw)) => parse_timestamp(&raw),
        _ => None,
    })
}

/// A number, or a string holding one. Anything else is unset.
fn lenient_coordinate<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(raw)) => raw.trim().parse().ok(),
        _ => None,
    })
}

fn nullable_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
