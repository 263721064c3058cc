//! Map presentation parameters.
//!
//! These are the knobs that distinguish deployments of the map view: which
//! fixed heat tuning to use and how much a marker popup shows. The tunings
//! themselves are constants in `sky-map`; only the choice is configurable.

use serde::{Deserialize, Serialize};
use sky_core::{HeatProfile, PopupDetail};

const fn default_page_size() -> u32 {
    1000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapConfig {
    #[serde(default)]
    pub heat_profile: HeatProfile,

    #[serde(default)]
    pub popup_detail: PopupDetail,

    /// Page size sent when the filter does not set one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            heat_profile: HeatProfile::default(),
            popup_detail: PopupDetail::default(),
            default_page_size: default_page_size(),
        }
    }
}
