//! Bounds and Web Mercator projection helpers.

use serde::{Deserialize, Serialize};
use sky_core::GeoPoint;

/// Tile edge length in pixels at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Highest zoom the map supports.
pub const MAX_ZOOM: u8 = 18;

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// A point in world pixel space at some zoom level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Project a position to world pixels at `zoom`.
#[must_use]
pub fn project(point: GeoPoint, zoom: u8) -> PixelPoint {
    let scale = TILE_SIZE * f64::from(1_u32 << zoom.min(MAX_ZOOM));
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * scale;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * scale;
    PixelPoint { x, y }
}

/// Axis-aligned geographic bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Bounds of a single point.
    #[must_use]
    pub const fn around(point: GeoPoint) -> Self {
        Self {
            south: point.lat,
            west: point.lng,
            north: point.lat,
            east: point.lng,
        }
    }

    /// Smallest bounds containing every point, or `None` for no points.
    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::around(iter.next()?);
        for point in iter {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: GeoPoint) {
        self.south = self.south.min(point.lat);
        self.north = self.north.max(point.lat);
        self.west = self.west.min(point.lng);
        self.east = self.east.max(point.lng);
    }

    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            lat: f64::midpoint(self.south, self.north),
            lng: f64::midpoint(self.west, self.east),
        }
    }

    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }
}

/// Largest zoom (capped at `max_zoom`) at which `bounds` fits inside a
/// `width` × `height` pixel viewport.
#[must_use]
pub fn zoom_to_fit(bounds: &GeoBounds, width: f64, height: f64, max_zoom: u8) -> u8 {
    let sw = GeoPoint {
        lat: bounds.south,
        lng: bounds.west,
    };
    let ne = GeoPoint {
        lat: bounds.north,
        lng: bounds.east,
    };
    (0..=max_zoom.min(MAX_ZOOM))
        .rev()
        .find(|&zoom| {
            let a = project(sw, zoom);
            let b = project(ne, zoom);
            (b.x - a.x).abs() <= width && (a.y - b.y).abs() <= height
        })
        .unwrap_or(0)
}
