//! A [`MapSurface`] that keeps what it was asked to draw so the CLI can
//! print it afterwards.

use std::fmt::Write as _;

use sky_map::geo::{MAX_ZOOM, zoom_to_fit};
use sky_map::heat::Rgb;
use sky_map::{ClusterLayer, GeoBounds, HeatLayer, LayerKind, MapSurface};

/// Zoom used before anything has been fitted: the continental US.
pub const OVERVIEW_ZOOM: u8 = 4;

/// Density ramp from empty to peak.
const SHADES: &[u8] = b" .:-=+*#%@";

#[derive(Debug, Clone, PartialEq)]
pub enum DrawnLayer {
    Clusters(ClusterLayer),
    Heat(HeatLayer),
}

impl DrawnLayer {
    const fn kind(&self) -> LayerKind {
        match self {
            Self::Clusters(_) => LayerKind::Clusters,
            Self::Heat(_) => LayerKind::Heat,
        }
    }
}

#[derive(Debug)]
pub struct TerminalSurface {
    width_px: f64,
    height_px: f64,
    fixed_zoom: Option<u8>,
    zoom: u8,
    layer: Option<DrawnLayer>,
}

impl TerminalSurface {
    /// `fixed_zoom` pins the zoom level; fits then leave it alone.
    #[must_use]
    pub fn new(width_px: f64, height_px: f64, fixed_zoom: Option<u8>) -> Self {
        Self {
            width_px,
            height_px,
            fixed_zoom,
            zoom: fixed_zoom.unwrap_or(OVERVIEW_ZOOM),
            layer: None,
        }
    }

    #[must_use]
    pub const fn layer(&self) -> Option<&DrawnLayer> {
        self.layer.as_ref()
    }

    #[must_use]
    pub const fn clusters(&self) -> Option<&ClusterLayer> {
        match self.layer() {
            Some(DrawnLayer::Clusters(layer)) => Some(layer),
            _ => None,
        }
    }

    /// Print the heat layer as a `cols` × `rows` character grid covering the
    /// layer's own extent. `None` when no heat layer is drawn or it is empty.
    #[must_use]
    pub fn draw_heat(&self, cols: usize, rows: usize, color: bool) -> Option<String> {
        let Some(DrawnLayer::Heat(layer)) = &self.layer else {
            return None;
        };
        let bounds = layer.bounds()?;
        let raster = layer.rasterize(&bounds, cols, rows);

        let mut out = String::with_capacity((cols + 1) * rows);
        for y in 0..raster.height {
            for x in 0..raster.width {
                let glyph = char::from(SHADES[shade_index(raster.intensity(x, y))]);
                match raster.color_at(x, y) {
                    Some((rgb, _)) if color => {
                        let Rgb(r, g, b) = rgb;
                        let _ = write!(out, "\u{1b}[38;2;{r};{g};{b}m{glyph}\u{1b}[0m");
                    }
                    _ => out.push(glyph),
                }
            }
            out.push('\n');
        }
        Some(out.trim_end_matches('\n').to_string())
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn shade_index(t: f64) -> usize {
    if t <= 0.0 {
        return 0;
    }
    let top = SHADES.len() - 1;
    ((t * top as f64).ceil() as usize).clamp(1, top)
}

impl MapSurface for TerminalSurface {
    fn zoom(&self) -> u8 {
        self.zoom
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        if self.fixed_zoom.is_none() {
            self.zoom = zoom_to_fit(&bounds, self.width_px, self.height_px, MAX_ZOOM);
            tracing::debug!(zoom = self.zoom, "viewport fitted");
        }
    }

    fn show_clusters(&mut self, layer: &ClusterLayer) {
        self.layer = Some(DrawnLayer::Clusters(layer.clone()));
    }

    fn show_heat(&mut self, layer: &HeatLayer) {
        self.layer = Some(DrawnLayer::Heat(layer.clone()));
    }

    fn remove_layer(&mut self, kind: LayerKind) {
        if self.layer.as_ref().is_some_and(|l| l.kind() == kind) {
            self.layer = None;
        }
    }
}
