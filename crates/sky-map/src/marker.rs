//! Point markers and their popup content.

use serde::Serialize;
use sky_core::{GeoPoint, PopupDetail, Record, RecordId, ShapeClass};

/// Characters of summary shown in a detailed popup.
const SUMMARY_PREVIEW_CHARS: usize = 200;

/// One plotted record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub record_id: RecordId,
    pub position: GeoPoint,
    pub shape_class: ShapeClass,
    pub popup: Popup,
}

/// Text shown when a marker is selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<String>,
}

impl Popup {
    #[must_use]
    pub fn for_record(record: &Record, detail: PopupDetail) -> Self {
        let title = match record.location_label() {
            label if label.is_empty() => "Unknown location".to_string(),
            label => label,
        };

        let shape = record
            .shape
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown");
        let date = record
            .occurred_at
            .map_or_else(|| "Unknown date".to_string(), |ts| ts.format("%Y-%m-%d").to_string());

        let mut lines = vec![format!("Shape: {shape}"), format!("Date: {date}")];

        if detail == PopupDetail::Detailed {
            if !record.duration.trim().is_empty() {
                lines.push(format!("Duration: {}", record.duration.trim()));
            }
            let summary = record.summary.trim();
            if !summary.is_empty() {
                lines.push(preview(summary, SUMMARY_PREVIEW_CHARS));
            }
        }

        Self { title, lines }
    }
}

/// Build a marker for every record with a valid position, in input order.
/// Records without one are skipped.
#[must_use]
pub fn build_markers(records: &[Record], detail: PopupDetail) -> Vec<Marker> {
    records
        .iter()
        .filter_map(|record| {
            let position = record.position()?;
            Some(Marker {
                record_id: record.id.clone(),
                position,
                shape_class: record.shape_class(),
                popup: Popup::for_record(record, detail),
            })
        })
        .collect()
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record() -> Record {
        Record::new(7)
            .with_city("Roswell")
            .with_region("NM")
            .with_shape("Disk")
            .with_position(33.39, -104.52)
            .with_occurred_at(
                NaiveDate::from_ymd_opt(1947, 7, 8)
                    .unwrap()
                    .and_hms_opt(22, 0, 0)
                    .unwrap(),
            )
    }

    #[test]
    fn compact_popup() {
        let popup = Popup::for_record(&record(), PopupDetail::Compact);
        assert_eq!(popup.title, "Roswell, NM");
        assert_eq!(popup.lines, vec!["Shape: Disk", "Date: 1947-07-08"]);
    }

    #[test]
    fn detailed_popup_truncates_summary() {
        let mut rec = record();
        rec.duration = "10 min".into();
        rec.summary = "x".repeat(250);
        let popup = Popup::for_record(&rec, PopupDetail::Detailed);
        assert_eq!(popup.lines[2], "Duration: 10 min");
        assert_eq!(popup.lines[3].len(), SUMMARY_PREVIEW_CHARS + 3);
        assert!(popup.lines[3].ends_with("..."));
    }

    #[test]
    fn unknown_fields_have_placeholders() {
        let popup = Popup::for_record(&Record::new(1), PopupDetail::Compact);
        assert_eq!(popup.title, "Unknown location");
        assert_eq!(popup.lines, vec!["Shape: unknown", "Date: Unknown date"]);
    }

    #[test]
    fn records_without_position_are_skipped() {
        let records = vec![record(), Record::new(8).with_shape("light"), Record::new(9).with_position(10.0, 10.0)];
        let markers = build_markers(&records, PopupDetail::Compact);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].shape_class, ShapeClass::Disk);
        assert_eq!(markers[1].shape_class, ShapeClass::Other);
    }
}
