//! Screen-space marker clustering.
//!
//! Greedy grid clustering: markers are projected to world pixels at the
//! current zoom and bucketed into square cells one merge radius wide. Each
//! marker joins the nearest existing cluster whose seed lies within the
//! merge radius in the 3×3 neighbourhood of its cell, otherwise it seeds a
//! new cluster. Input order decides which marker seeds, so the result is
//! deterministic for a given record list.

use std::collections::HashMap;

use serde::Serialize;
use sky_core::{GeoPoint, ShapeClass};

use crate::geo::{GeoBounds, PixelPoint, project};
use crate::marker::Marker;

/// Merge radius in screen pixels.
pub const MERGE_RADIUS_PX: f64 = 80.0;

/// From this zoom on every marker stands alone.
pub const DISABLE_CLUSTERING_AT_ZOOM: u8 = 18;

/// A group of nearby markers drawn as one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Mean position of the members.
    pub center: GeoPoint,
    /// Indices into [`ClusterLayer::markers`].
    pub members: Vec<usize>,
    pub bounds: GeoBounds,
    /// Most common shape class among members, first seen wins ties.
    pub dominant_shape: ShapeClass,
}

impl Cluster {
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A single-member cluster is drawn as the plain marker.
    #[must_use]
    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }
}

/// Markers grouped for one zoom level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterLayer {
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub clusters: Vec<Cluster>,
}

impl ClusterLayer {
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Bounds of every marker, `None` when there are none.
    #[must_use]
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.markers.iter().map(|m| m.position))
    }

    /// Re-group the same markers for a new zoom level.
    #[must_use]
    pub fn regroup(self, zoom: u8) -> Self {
        cluster_markers(self.markers, zoom, MERGE_RADIUS_PX)
    }
}

struct Seed {
    pixel: PixelPoint,
    members: Vec<usize>,
}

/// Group `markers` for display at `zoom`.
#[must_use]
pub fn cluster_markers(markers: Vec<Marker>, zoom: u8, radius_px: f64) -> ClusterLayer {
    if zoom >= DISABLE_CLUSTERING_AT_ZOOM || radius_px <= 0.0 {
        let clusters = (0..markers.len())
            .map(|i| finish(&markers, vec![i]))
            .collect();
        return ClusterLayer {
            zoom,
            markers,
            clusters,
        };
    }

    let mut seeds: Vec<Seed> = Vec::new();
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();

    for (index, marker) in markers.iter().enumerate() {
        let pixel = project(marker.position, zoom);
        let cell = cell_of(pixel, radius_px);

        let nearest = neighbours(cell)
            .filter_map(|c| grid.get(&c))
            .flatten()
            .map(|&seed| (seed, seeds[seed].pixel.distance(pixel)))
            .filter(|&(_, d)| d <= radius_px)
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        if let Some((seed, _)) = nearest {
            seeds[seed].members.push(index);
        } else {
            grid.entry(cell).or_default().push(seeds.len());
            seeds.push(Seed {
                pixel,
                members: vec![index],
            });
        }
    }

    let clusters = seeds
        .into_iter()
        .map(|seed| finish(&markers, seed.members))
        .collect();

    ClusterLayer {
        zoom,
        markers,
        clusters,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(pixel: PixelPoint, size: f64) -> (i64, i64) {
    ((pixel.x / size).floor() as i64, (pixel.y / size).floor() as i64)
}

fn neighbours((cx, cy): (i64, i64)) -> impl Iterator<Item = (i64, i64)> {
    (-1..=1).flat_map(move |dx| (-1..=1).map(move |dy| (cx + dx, cy + dy)))
}

#[allow(clippy::cast_precision_loss)]
fn finish(markers: &[Marker], members: Vec<usize>) -> Cluster {
    let n = members.len() as f64;
    let (lat_sum, lng_sum) = members.iter().fold((0.0, 0.0), |(lat, lng), &i| {
        (lat + markers[i].position.lat, lng + markers[i].position.lng)
    });
    let center = GeoPoint {
        lat: lat_sum / n,
        lng: lng_sum / n,
    };

    let mut bounds = GeoBounds::around(markers[members[0]].position);
    for &i in &members[1..] {
        bounds.extend(markers[i].position);
    }

    let mut tally: Vec<(ShapeClass, usize)> = Vec::new();
    for &i in &members {
        let shape = markers[i].shape_class;
        match tally.iter_mut().find(|(s, _)| *s == shape) {
            Some((_, count)) => *count += 1,
            None => tally.push((shape, 1)),
        }
    }
    let dominant_shape = tally
        .iter()
        .fold(None::<(ShapeClass, usize)>, |best, &(shape, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((shape, count)),
        })
        .map_or(ShapeClass::Other, |(shape, _)| shape);

    Cluster {
        center,
        members,
        bounds,
        dominant_shape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::build_markers;
    use pretty_assertions::assert_eq;
    use sky_core::{PopupDetail, Record};

    fn markers(points: &[(f64, f64, &str)]) -> Vec<Marker> {
        let records: Vec<Record> = points
            .iter()
            .enumerate()
            .map(|(i, &(lat, lng, shape))| {
                Record::new(i as u64)
                    .with_position(lat, lng)
                    .with_shape(shape)
            })
            .collect();
        build_markers(&records, PopupDetail::Compact)
    }

    fn albuquerque_and_boston() -> Vec<Marker> {
        markers(&[
            (35.08, -106.65, "disk"),
            (35.09, -106.64, "light"),
            (35.10, -106.66, "disk"),
            (42.36, -71.06, "triangle"),
        ])
    }

    #[test]
    fn nearby_points_merge_at_low_zoom() {
        let layer = cluster_markers(albuquerque_and_boston(), 4, MERGE_RADIUS_PX);
        assert_eq!(layer.clusters.len(), 2);

        let abq = &layer.clusters[0];
        assert_eq!(abq.members, vec![0, 1, 2]);
        assert_eq!(abq.dominant_shape, ShapeClass::Disk);
        assert!((abq.center.lat - 35.09).abs() < 1e-9);

        let bos = &layer.clusters[1];
        assert!(bos.is_singleton());
        assert_eq!(bos.dominant_shape, ShapeClass::Triangle);
    }

    #[test]
    fn points_separate_at_high_zoom() {
        let layer = cluster_markers(albuquerque_and_boston(), 16, MERGE_RADIUS_PX);
        assert_eq!(layer.clusters.len(), 4);
        assert!(layer.clusters.iter().all(Cluster::is_singleton));
    }

    #[test]
    fn max_zoom_disables_clustering() {
        let same_spot = markers(&[(35.0, -106.0, "disk"), (35.0, -106.0, "disk")]);
        let layer = cluster_markers(same_spot, DISABLE_CLUSTERING_AT_ZOOM, MERGE_RADIUS_PX);
        assert_eq!(layer.clusters.len(), 2);
    }

    #[test]
    fn every_marker_lands_in_exactly_one_cluster() {
        let layer = cluster_markers(albuquerque_and_boston(), 0, MERGE_RADIUS_PX);
        let mut seen: Vec<usize> = layer
            .clusters
            .iter()
            .flat_map(|c| c.members.iter().copied())
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_input_gives_empty_layer() {
        let layer = cluster_markers(Vec::new(), 5, MERGE_RADIUS_PX);
        assert!(layer.clusters.is_empty());
        assert!(layer.bounds().is_none());
    }

    #[test]
    fn dominant_shape_tie_goes_to_first_seen() {
        let pair = markers(&[(35.0, -106.0, "light"), (35.0, -106.0, "disk")]);
        let layer = cluster_markers(pair, 3, MERGE_RADIUS_PX);
        assert_eq!(layer.clusters.len(), 1);
        assert_eq!(layer.clusters[0].dominant_shape, ShapeClass::Light);
    }

    #[test]
    fn regroup_keeps_markers() {
        let layer = cluster_markers(albuquerque_and_boston(), 4, MERGE_RADIUS_PX).regroup(16);
        assert_eq!(layer.zoom, 16);
        assert_eq!(layer.marker_count(), 4);
        assert_eq!(layer.clusters.len(), 4);
    }
}
