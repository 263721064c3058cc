//! Closed enumerations used across SkyWatch.
//!
//! All enums use `snake_case` serialization and expose `as_str()` plus a
//! `FromStr` impl so configuration files, query strings, and the CLI all
//! agree on spelling.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// ResearchTier
// ---------------------------------------------------------------------------

/// Depth of AI-generated narrative requested for a record.
///
/// ```text
/// quick → full
/// ```
///
/// A full report is only requested once a quick one has been shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchTier {
    Quick,
    Full,
}

impl ResearchTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for ResearchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResearchTier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "full" => Ok(Self::Full),
            other => Err(CoreError::UnknownVariant {
                kind: "research tier",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ShapeClass
// ---------------------------------------------------------------------------

/// Visual class of a map marker, derived from the record's shape tag.
///
/// Unrecognized or absent shapes fall back to [`ShapeClass::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeClass {
    Disk,
    Triangle,
    Sphere,
    Light,
    Other,
}

impl ShapeClass {
    /// Classify a raw shape tag. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    #[must_use]
    pub fn from_shape(shape: Option<&str>) -> Self {
        let Some(shape) = shape else {
            return Self::Other;
        };
        match shape.trim().to_ascii_lowercase().as_str() {
            "disk" | "disc" => Self::Disk,
            "triangle" => Self::Triangle,
            "sphere" => Self::Sphere,
            "light" => Self::Light,
            _ => Self::Other,
        }
    }

    /// CSS-style class name used by marker icons.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Triangle => "triangle",
            Self::Sphere => "sphere",
            Self::Light => "light",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ShapeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RenderMode
// ---------------------------------------------------------------------------

/// The two mutually exclusive presentation modes of the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Markers,
    Heat,
}

impl RenderMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markers => "markers",
            Self::Heat => "heat",
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Markers => Self::Heat,
            Self::Heat => Self::Markers,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markers" | "marker" | "clusters" => Ok(Self::Markers),
            "heat" | "heatmap" => Ok(Self::Heat),
            other => Err(CoreError::UnknownVariant {
                kind: "render mode",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// HeatProfile
// ---------------------------------------------------------------------------

/// Which fixed heat-surface tuning the map uses.
///
/// `Standard` is the sparse, wide-kernel look; `Dense` uses a tighter
/// kernel suited to large record sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatProfile {
    #[default]
    Standard,
    Dense,
}

impl HeatProfile {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Dense => "dense",
        }
    }
}

impl fmt::Display for HeatProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PopupDetail
// ---------------------------------------------------------------------------

/// How much of a record a marker popup shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupDetail {
    #[default]
    Compact,
    Detailed,
}

impl PopupDetail {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for PopupDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("disk"), ShapeClass::Disk)]
    #[case(Some("Disc"), ShapeClass::Disk)]
    #[case(Some(" TRIANGLE "), ShapeClass::Triangle)]
    #[case(Some("sphere"), ShapeClass::Sphere)]
    #[case(Some("light"), ShapeClass::Light)]
    #[case(Some("cigar"), ShapeClass::Other)]
    #[case(Some(""), ShapeClass::Other)]
    #[case(None, ShapeClass::Other)]
    fn shape_classification(#[case] raw: Option<&str>, #[case] expected: ShapeClass) {
        assert_eq!(ShapeClass::from_shape(raw), expected);
    }

    #[test]
    fn render_mode_toggles() {
        assert_eq!(RenderMode::Markers.toggled(), RenderMode::Heat);
        assert_eq!(RenderMode::Heat.toggled(), RenderMode::Markers);
        assert_eq!(RenderMode::default(), RenderMode::Markers);
    }

    #[test]
    fn render_mode_parses_aliases() {
        assert_eq!("heatmap".parse::<RenderMode>(), Ok(RenderMode::Heat));
        assert_eq!("Markers".parse::<RenderMode>(), Ok(RenderMode::Markers));
        assert!(matches!(
            "globe".parse::<RenderMode>(),
            Err(CoreError::UnknownVariant { kind: "render mode", .. })
        ));
    }

    #[test]
    fn tier_roundtrips_through_strings() {
        for tier in [ResearchTier::Quick, ResearchTier::Full] {
            assert_eq!(tier.as_str().parse::<ResearchTier>(), Ok(tier));
        }
        let json = serde_json::to_string(&ResearchTier::Full).unwrap();
        assert_eq!(json, "\"full\"");
    }

    #[test]
    fn heat_profile_deserializes_snake_case() {
        let profile: HeatProfile = serde_json::from_str("\"dense\"").unwrap();
        assert_eq!(profile, HeatProfile::Dense);
        assert!(serde_json::from_str::<HeatProfile>("\"blurry\"").is_err());
    }
}
