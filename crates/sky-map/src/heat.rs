//! Density surface for heat mode.
//!
//! Every positioned record contributes one unit of weight. The visual
//! constants (radius, blur, opacity, colour ramp) come from a fixed
//! [`HeatTuning`] preset selected by [`HeatProfile`]; they are not exposed
//! as individual settings.

use std::fmt;

use serde::Serialize;
use sky_core::{GeoPoint, HeatProfile, Record};

use crate::geo::GeoBounds;

// ---------------------------------------------------------------------------
// Colour ramp
// ---------------------------------------------------------------------------

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::suboptimal_flops
    )]
    fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Self(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// One stop of the gradient: colour at normalized density `at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorStop {
    pub at: f64,
    pub color: Rgb,
}

const fn stop(at: f64, r: u8, g: u8, b: u8) -> ColorStop {
    ColorStop {
        at,
        color: Rgb(r, g, b),
    }
}

// ---------------------------------------------------------------------------
// Tuning presets
// ---------------------------------------------------------------------------

/// Fixed visual constants of the density surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatTuning {
    /// Point radius in pixels.
    pub radius: f64,
    /// Blur in pixels.
    pub blur: f64,
    /// Zoom at which a single point reaches full intensity.
    pub max_zoom: u8,
    pub min_opacity: f64,
    /// Cool to hot, ascending `at`.
    pub gradient: [ColorStop; 6],
}

impl HeatTuning {
    pub const STANDARD: Self = Self {
        radius: 25.0,
        blur: 15.0,
        max_zoom: 17,
        min_opacity: 0.4,
        gradient: [
            stop(0.1, 0, 0, 255),
            stop(0.3, 0, 255, 255),
            stop(0.5, 0, 255, 0),
            stop(0.7, 255, 255, 0),
            stop(0.85, 255, 165, 0),
            stop(1.0, 255, 0, 0),
        ],
    };

    pub const DENSE: Self = Self {
        radius: 15.0,
        blur: 10.0,
        max_zoom: 12,
        min_opacity: 0.3,
        gradient: [
            stop(0.2, 0, 0, 128),
            stop(0.4, 0, 0, 255),
            stop(0.55, 0, 255, 255),
            stop(0.7, 0, 255, 0),
            stop(0.85, 255, 255, 0),
            stop(1.0, 255, 0, 0),
        ],
    };

    #[must_use]
    pub const fn for_profile(profile: HeatProfile) -> Self {
        match profile {
            HeatProfile::Standard => Self::STANDARD,
            HeatProfile::Dense => Self::DENSE,
        }
    }

    /// Colour of normalized density `t` (clamped to `0..=1`).
    #[must_use]
    pub fn color_for(&self, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let first = self.gradient[0];
        if t <= first.at {
            return first.color;
        }
        for pair in self.gradient.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if t <= hi.at {
                let span = hi.at - lo.at;
                let local = if span > 0.0 { (t - lo.at) / span } else { 1.0 };
                return lo.color.lerp(hi.color, local);
            }
        }
        self.gradient[self.gradient.len() - 1].color
    }
}

impl Default for HeatTuning {
    fn default() -> Self {
        Self::STANDARD
    }
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub position: GeoPoint,
    pub weight: f64,
}

/// Weighted points plus the tuning to draw them with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatLayer {
    pub points: Vec<HeatPoint>,
    pub tuning: HeatTuning,
}

impl HeatLayer {
    /// Unit-weight point for every record with a valid position.
    #[must_use]
    pub fn from_records(records: &[Record], tuning: HeatTuning) -> Self {
        let points = records
            .iter()
            .filter_map(Record::position)
            .map(|position| HeatPoint {
                position,
                weight: 1.0,
            })
            .collect();
        Self { points, tuning }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.points.iter().map(|p| p.position))
    }

    /// Accumulate the points into a `width` × `height` grid covering `bounds`.
    ///
    /// Each point spreads over a square kernel whose half-width derives from
    /// `radius + blur`, falling off linearly with distance. Cells are then
    /// normalized so the densest is `1.0`.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_possible_wrap,
        clippy::cast_precision_loss
    )]
    pub fn rasterize(&self, bounds: &GeoBounds, width: usize, height: usize) -> HeatRaster {
        let mut cells = vec![0.0_f64; width * height];
        if width == 0 || height == 0 {
            return HeatRaster {
                width,
                height,
                cells,
                tuning: self.tuning,
            };
        }

        let bounds = padded(*bounds);
        let kernel = ((self.tuning.radius + self.tuning.blur) / 16.0).ceil().max(1.0) as i64;
        let reach = kernel as f64 + 1.0;

        for point in &self.points {
            if !bounds.contains(point.position) {
                continue;
            }
            let fx = (point.position.lng - bounds.west) / bounds.lng_span();
            let fy = (bounds.north - point.position.lat) / bounds.lat_span();
            let cx = ((fx * width as f64) as i64).min(width as i64 - 1);
            let cy = ((fy * height as f64) as i64).min(height as i64 - 1);

            for dy in -kernel..=kernel {
                for dx in -kernel..=kernel {
                    let (x, y) = (cx + dx, cy + dy);
                    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                        continue;
                    }
                    let d = (dx as f64).hypot(dy as f64);
                    let falloff = 1.0 - d / reach;
                    if falloff > 0.0 {
                        cells[y as usize * width + x as usize] += point.weight * falloff;
                    }
                }
            }
        }

        let peak = cells.iter().copied().fold(0.0_f64, f64::max);
        if peak > 0.0 {
            for cell in &mut cells {
                *cell /= peak;
            }
        }

        HeatRaster {
            width,
            height,
            cells,
            tuning: self.tuning,
        }
    }
}

/// Degenerate spans (one point, or all points on a line) get a small margin
/// so every point maps inside the grid.
fn padded(mut bounds: GeoBounds) -> GeoBounds {
    const PAD: f64 = 0.5;
    if bounds.lat_span() <= f64::EPSILON {
        bounds.south -= PAD;
        bounds.north += PAD;
    }
    if bounds.lng_span() <= f64::EPSILON {
        bounds.west -= PAD;
        bounds.east += PAD;
    }
    bounds
}

/// Normalized density grid, row-major from the north-west corner.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatRaster {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<f64>,
    pub tuning: HeatTuning,
}

impl HeatRaster {
    #[must_use]
    pub fn intensity(&self, x: usize, y: usize) -> f64 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.cells[y * self.width + x]
    }

    /// Colour and opacity of a cell, or `None` where there is no density.
    #[must_use]
    pub fn color_at(&self, x: usize, y: usize) -> Option<(Rgb, f64)> {
        let t = self.intensity(x, y);
        if t <= 0.0 {
            return None;
        }
        let alpha = self.tuning.min_opacity + (1.0 - self.tuning.min_opacity) * t;
        Some((self.tuning.color_for(t), alpha))
    }
}
