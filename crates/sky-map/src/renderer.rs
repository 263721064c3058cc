//! Two-mode map renderer.
//!
//! [`MapRenderer`] decides what to draw; a [`MapSurface`] draws it. The
//! renderer holds at most one layer on the surface at a time and always
//! removes the previous one before adding the next, so toggling modes in
//! any order never leaves a stale layer behind.

use serde::Serialize;
use sky_config::MapConfig;
use sky_core::{PopupDetail, Record, RenderMode};

use crate::cluster::{ClusterLayer, MERGE_RADIUS_PX, cluster_markers};
use crate::geo::GeoBounds;
use crate::heat::{HeatLayer, HeatTuning};
use crate::marker::build_markers;

/// Kind of layer currently on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Clusters,
    Heat,
}

/// Presentation adapter the renderer draws through.
pub trait MapSurface {
    /// Current zoom level, after any fit.
    fn zoom(&self) -> u8;

    /// Move the viewport so `bounds` is fully visible.
    fn fit_bounds(&mut self, bounds: GeoBounds);

    fn show_clusters(&mut self, layer: &ClusterLayer);

    fn show_heat(&mut self, layer: &HeatLayer);

    fn remove_layer(&mut self, kind: LayerKind);
}

/// Differences between map presentations, gathered into one struct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub heat: HeatTuning,
    pub popup_detail: PopupDetail,
    pub merge_radius_px: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            heat: HeatTuning::STANDARD,
            popup_detail: PopupDetail::Compact,
            merge_radius_px: MERGE_RADIUS_PX,
        }
    }
}

impl From<&MapConfig> for RendererConfig {
    fn from(config: &MapConfig) -> Self {
        Self {
            heat: HeatTuning::for_profile(config.heat_profile),
            popup_detail: config.popup_detail,
            merge_radius_px: MERGE_RADIUS_PX,
        }
    }
}

/// What a render pass put on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub mode: RenderMode,
    /// Records with a valid position.
    pub plotted: usize,
    /// Records left off the map for lack of a position.
    pub skipped: usize,
    /// Whether the viewport was moved to fit the markers.
    pub fitted: bool,
}

pub struct MapRenderer<S> {
    surface: S,
    config: RendererConfig,
    mode: RenderMode,
    active: Option<LayerKind>,
    clusters: Option<ClusterLayer>,
}

impl<S: MapSurface> MapRenderer<S> {
    pub fn new(surface: S, config: RendererConfig) -> Self {
        Self {
            surface,
            config,
            mode: RenderMode::default(),
            active: None,
            clusters: None,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> RenderMode {
        self.mode
    }

    #[must_use]
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Layer currently on the surface, if any.
    #[must_use]
    pub const fn active_layer(&self) -> Option<LayerKind> {
        self.active
    }

    /// Cluster layer from the last markers render.
    #[must_use]
    pub const fn clusters(&self) -> Option<&ClusterLayer> {
        self.clusters.as_ref()
    }

    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Switch mode and redraw `records`. Re-entering the current mode
    /// still redraws so the surface reflects the latest list.
    pub fn set_mode(&mut self, mode: RenderMode, records: &[Record]) -> RenderReport {
        if mode != self.mode {
            tracing::debug!(from = %self.mode, to = %mode, "render mode change");
        }
        self.mode = mode;
        self.render(records)
    }

    /// Replace whatever is drawn with `records` in the current mode.
    pub fn render(&mut self, records: &[Record]) -> RenderReport {
        self.clear();
        match self.mode {
            RenderMode::Markers => self.render_markers(records),
            RenderMode::Heat => self.render_heat(records),
        }
    }

    /// Re-group the current markers after the user zoomed.
    pub fn on_zoom_changed(&mut self) {
        if self.active != Some(LayerKind::Clusters) {
            return;
        }
        let Some(layer) = self.clusters.take() else {
            return;
        };
        let zoom = self.surface.zoom();
        let layer = if layer.zoom == zoom {
            layer
        } else {
            let regrouped = cluster_markers(layer.markers, zoom, self.config.merge_radius_px);
            self.surface.remove_layer(LayerKind::Clusters);
            self.surface.show_clusters(&regrouped);
            regrouped
        };
        self.clusters = Some(layer);
    }

    /// Remove the active layer, leaving an empty surface.
    pub fn clear(&mut self) {
        if let Some(kind) = self.active.take() {
            self.surface.remove_layer(kind);
        }
        self.clusters = None;
    }

    fn render_markers(&mut self, records: &[Record]) -> RenderReport {
        let markers = build_markers(records, self.config.popup_detail);
        let plotted = markers.len();

        let fitted = match GeoBounds::from_points(markers.iter().map(|m| m.position)) {
            Some(bounds) => {
                self.surface.fit_bounds(bounds);
                true
            }
            None => {
                tracing::debug!("no positioned records, keeping viewport");
                false
            }
        };

        let layer = cluster_markers(markers, self.surface.zoom(), self.config.merge_radius_px);
        self.surface.show_clusters(&layer);
        self.active = Some(LayerKind::Clusters);
        self.clusters = Some(layer);

        RenderReport {
            mode: RenderMode::Markers,
            plotted,
            skipped: records.len() - plotted,
            fitted,
        }
    }

    fn render_heat(&mut self, records: &[Record]) -> RenderReport {
        let layer = HeatLayer::from_records(records, self.config.heat);
        let plotted = layer.points.len();
        self.surface.show_heat(&layer);
        self.active = Some(LayerKind::Heat);

        RenderReport {
            mode: RenderMode::Heat,
            plotted,
            skipped: records.len() - plotted,
            fitted: false,
        }
    }
}
