use serde::Serialize;
use sky_map::{ClusterLayer, MapSession, Refresh, RenderReport, StatsSummary};

use crate::cli::root_commands::MapArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::{output, table, table_options};
use crate::terminal::TerminalSurface;
use crate::ui;

/// Pixel viewport the terminal surface fits into.
const VIEWPORT_PX: (f64, f64) = (1024.0, 768.0);

#[derive(Debug, Serialize)]
struct MapResponse {
    query: String,
    report: RenderReport,
    stats: StatsSummary,
    zoom: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    clusters: Vec<ClusterRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ClusterRow {
    size: usize,
    lat: f64,
    lng: f64,
    shape: String,
    /// Popup title of the first member.
    title: String,
}

/// `skywatch map`: fetch, draw, and print the stats beside the drawing.
pub async fn handle(args: &MapArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let surface = TerminalSurface::new(VIEWPORT_PX.0, VIEWPORT_PX.1, args.zoom);
    let mut session = MapSession::new(
        ctx.client.clone(),
        ctx.client.clone(),
        surface,
        &ctx.config.map,
    );

    if !matches!(session.apply_filters(args.predicate()).await, Refresh::Rendered(_)) {
        let message = session
            .notice()
            .map_or_else(|| "records unavailable".to_string(), |n| n.message.clone());
        anyhow::bail!(message);
    }
    let report = session.set_mode(args.mode);

    let surface = session.renderer().surface();
    let clusters = surface.clusters().map(cluster_rows).unwrap_or_default();
    let response = MapResponse {
        query: session.filters().to_query_string(),
        report,
        stats: session.stats().clone(),
        zoom: sky_map::MapSurface::zoom(surface),
        clusters,
    };

    if flags.format != OutputFormat::Table {
        return output(&response, flags.format);
    }

    println!("{}", stats_block(&response.stats, &response.report));
    println!();
    match surface.draw_heat(args.width, args.height, ui::prefs().color) {
        Some(grid) => println!("{grid}"),
        None if response.clusters.is_empty() => println!("(nothing to plot)"),
        None => println!("{}", clusters_table(&response.clusters)),
    }
    Ok(())
}

fn cluster_rows(layer: &ClusterLayer) -> Vec<ClusterRow> {
    layer
        .clusters
        .iter()
        .map(|cluster| ClusterRow {
            size: cluster.len(),
            lat: round4(cluster.center.lat),
            lng: round4(cluster.center.lng),
            shape: cluster.dominant_shape.to_string(),
            title: cluster
                .members
                .first()
                .and_then(|&i| layer.markers.get(i))
                .map(|m| m.popup.title.clone())
                .unwrap_or_default(),
        })
        .collect()
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn stats_block(stats: &StatsSummary, report: &RenderReport) -> String {
    let mut lines = vec![
        format!("Total records: {}", stats.total),
        format!("Visible on map: {}", stats.visible),
        format!("Most common shape: {}", stats.modal_shape_label()),
        format!("Date range: {}", stats.date_span_label()),
    ];
    if report.skipped > 0 {
        lines.push(format!("({} without coordinates)", report.skipped));
    }
    lines.join("\n")
}

fn clusters_table(rows: &[ClusterRow]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.size.to_string(),
                format!("{:.4}", row.lat),
                format!("{:.4}", row.lng),
                row.shape.clone(),
                row.title.clone(),
            ]
        })
        .collect();
    table::render_table(&["size", "lat", "lng", "shape", "title"], &rows, table_options())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sky_core::{PopupDetail, Record, RenderMode};
    use sky_map::cluster::{MERGE_RADIUS_PX, cluster_markers};
    use sky_map::marker::build_markers;
    use sky_map::summarize;

    #[test]
    fn cluster_rows_describe_each_group() {
        let records = vec![
            Record::new("1")
                .with_position(35.08, -106.65)
                .with_shape("disk")
                .with_city("Albuquerque"),
            Record::new("2").with_position(35.10, -106.60).with_shape("disk"),
            Record::new("3").with_position(42.36, -71.06).with_shape("light"),
        ];
        let markers = build_markers(&records, PopupDetail::Compact);
        let layer = cluster_markers(markers, 10, MERGE_RADIUS_PX);
        let rows = cluster_rows(&layer);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].size, 2);
        assert_eq!(rows[0].shape, "disk");
        assert!(rows[0].title.contains("Albuquerque"));
        assert_eq!(rows[1].shape, "light");
    }

    #[test]
    fn stats_block_uses_placeholders_for_empty_lists() {
        let report = RenderReport {
            mode: RenderMode::Markers,
            plotted: 0,
            skipped: 0,
            fitted: false,
        };
        assert_eq!(
            stats_block(&summarize(&[]), &report),
            "Total records: 0\nVisible on map: 0\nMost common shape: N/A\nDate range: N/A"
        );
    }

    #[test]
    fn stats_block_mentions_unplotted_records() {
        let records = vec![Record::new("1"), Record::new("2").with_position(35.0, -106.0)];
        let report = RenderReport {
            mode: RenderMode::Markers,
            plotted: 1,
            skipped: 1,
            fitted: true,
        };
        let block = stats_block(&summarize(&records), &report);
        assert!(block.ends_with("(1 without coordinates)"));
    }
}
