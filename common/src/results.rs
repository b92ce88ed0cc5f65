use std::f64::consts::PI;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::format::{cell_text, format_number, format_percentage, title_case_key};

/// Rows rendered per phase table; the rest is only in the downloads.
pub const TABLE_ROW_LIMIT: usize = 100;

/// Slice colours, reused from the start once a phase has more categories.
pub const PALETTE: [&str; 10] = [
    "#28a745", "#007bff", "#dc3545", "#ffc107", "#17a2b8", "#6c757d", "#20c997", "#e83e8c",
    "#fd7e14", "#6610f2",
];

pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Csv,
    Excel,
    Pdf,
}

impl DownloadFormat {
    pub const ALL: [DownloadFormat; 3] = [Self::Csv, Self::Excel, Self::Pdf];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Pdf => "pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
            Self::Pdf => "PDF",
        }
    }

    /// Id of the anchor the page points at the download.
    pub fn link_id(self) -> String {
        format!("download_{}", self.as_str())
    }

    pub fn url(self, job_id: &str) -> String {
        format!("/api/download/{job_id}/{}", self.as_str())
    }
}

/// Body of `GET /api/results/{job_id}`. Object key order is kept as sent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobResults {
    #[serde(default)]
    pub statistics_summary: Option<StatisticsSummary>,
    #[serde(default)]
    pub statistics: Map<String, Value>,
    #[serde(default)]
    pub phases: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatisticsSummary {
    #[serde(default)]
    pub total_sequences: Option<Value>,
}

impl JobResults {
    /// Total sequence count, when the server reported a non-zero one.
    pub fn total_sequences(&self) -> Option<String> {
        let value = self.statistics_summary.as_ref()?.total_sequences.as_ref()?;
        match value {
            Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            _ => None,
        }
    }

    pub fn charts(&self) -> Vec<PieChart> {
        self.statistics
            .iter()
            .filter_map(|(key, categories)| PieChart::from_counts(key, categories.as_object()?))
            .collect()
    }

    pub fn tables(&self) -> Vec<ResultTable> {
        self.phases
            .iter()
            .filter_map(|(key, rows)| ResultTable::from_rows(key, rows.as_array()?))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub key: String,
    pub title: String,
    pub total: f64,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color: &'static str,
    /// Share of the phase total, one decimal.
    pub percentage: String,
    /// Clockwise from twelve o'clock, in radians.
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieChart {
    /// `None` for a phase without categories.
    pub fn from_counts(key: &str, counts: &Map<String, Value>) -> Option<Self> {
        if counts.is_empty() {
            return None;
        }

        let values: Vec<(String, f64)> = counts
            .iter()
            .map(|(label, value)| (label.clone(), value.as_f64().unwrap_or(0.0)))
            .collect();
        let total: f64 = values.iter().map(|(_, value)| value).sum();

        let mut angle = 0.0;
        let slices = values
            .into_iter()
            .enumerate()
            .map(|(index, (label, value))| {
                let sweep = if total > 0.0 {
                    value / total * 2.0 * PI
                } else {
                    0.0
                };
                let slice = PieSlice {
                    percentage: format_percentage(value, total),
                    label,
                    value,
                    color: palette_color(index),
                    start_angle: angle,
                    end_angle: angle + sweep,
                };
                angle += sweep;
                slice
            })
            .collect();

        Some(Self {
            key: key.to_string(),
            title: title_case_key(key),
            total,
            slices,
        })
    }
}

impl PieSlice {
    pub fn tooltip(&self) -> String {
        format!(
            "{}: {} ({}%)",
            self.label,
            format_number(self.value),
            self.percentage
        )
    }

    /// SVG path for this slice of a pie centred at (`cx`, `cy`).
    pub fn svg_path(&self, cx: f64, cy: f64, radius: f64) -> String {
        let sweep = self.end_angle - self.start_angle;
        if sweep <= 0.0 {
            return String::new();
        }
        if sweep >= 2.0 * PI - 1e-9 {
            // A lone category: two half arcs, a single arc cannot close on itself.
            return format!(
                "M {cx:.3} {top:.3} A {radius:.3} {radius:.3} 0 1 1 {cx:.3} {bottom:.3} \
                 A {radius:.3} {radius:.3} 0 1 1 {cx:.3} {top:.3} Z",
                top = cy - radius,
                bottom = cy + radius,
            );
        }

        let (x0, y0) = polar(cx, cy, radius, self.start_angle);
        let (x1, y1) = polar(cx, cy, radius, self.end_angle);
        let large_arc = if sweep > PI { 1 } else { 0 };
        format!(
            "M {cx:.3} {cy:.3} L {x0:.3} {y0:.3} A {radius:.3} {radius:.3} 0 {large_arc} 1 {x1:.3} {y1:.3} Z"
        )
    }
}

fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.sin(), cy - radius * angle.cos())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub key: String,
    pub title: String,
    /// Raw keys of the first row.
    pub columns: Vec<String>,
    pub headers: Vec<String>,
    /// At most [`TABLE_ROW_LIMIT`] rows of cell text.
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

impl ResultTable {
    /// `None` for a phase without rows. Columns come from the first row
    /// only; later rows missing a column render an empty cell.
    pub fn from_rows(key: &str, rows: &[Value]) -> Option<Self> {
        let first = rows.first()?;
        let columns: Vec<String> = first
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();

        let rendered = rows
            .iter()
            .take(TABLE_ROW_LIMIT)
            .map(|row| {
                columns
                    .iter()
                    .map(|column| cell_text(row.get(column)))
                    .collect()
            })
            .collect();

        Some(Self {
            key: key.to_string(),
            title: title_case_key(key),
            headers: columns.iter().map(|column| title_case_key(column)).collect(),
            columns,
            rows: rendered,
            total_rows: rows.len(),
        })
    }

    pub fn is_truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }

    pub fn truncation_note(&self) -> Option<String> {
        self.is_truncated().then(|| {
            format!(
                "Showing first {} of {} results. Download full results using the buttons above.",
                self.rows.len(),
                self.total_rows
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn results(value: Value) -> JobResults {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn one_chart_per_non_empty_phase_in_server_order() {
        let parsed = results(json!({
            "statistics": {
                "phase_2": {"ssRNA(+)": 3, "Other": 1},
                "phase_1": {"Virus": 4},
                "phase_3": {}
            }
        }));
        let charts = parsed.charts();
        let keys: Vec<&str> = charts.iter().map(|chart| chart.key.as_str()).collect();
        assert_eq!(keys, vec!["phase_2", "phase_1"]);
        assert_eq!(charts[0].title, "Phase 2");
        assert_eq!(charts[0].slices.len(), 2);
        assert_eq!(charts[1].slices.len(), 1);
    }

    #[test]
    fn tooltip_shows_value_and_share() {
        let counts = json!({"Virus": 25, "Non-Virus": 75});
        let chart = PieChart::from_counts("phase_1", counts.as_object().unwrap()).unwrap();
        assert_eq!(chart.total, 100.0);
        assert_eq!(chart.slices[0].percentage, "25");
        assert_eq!(chart.slices[0].tooltip(), "Virus: 25 (25%)");
        assert_eq!(chart.slices[1].tooltip(), "Non-Virus: 75 (75%)");
    }

    #[test]
    fn palette_cycles_past_ten_categories() {
        let mut counts = Map::new();
        for index in 0..12 {
            counts.insert(format!("class_{index}"), json!(1));
        }
        let chart = PieChart::from_counts("phase_5", &counts).unwrap();
        assert_eq!(chart.slices.len(), 12);
        assert_eq!(chart.slices[10].color, PALETTE[0]);
        assert_eq!(chart.slices[11].color, PALETTE[1]);
        assert_eq!(chart.slices[1].percentage, "8.3");
    }

    #[test]
    fn slices_cover_the_full_circle() {
        let counts = json!({"a": 1, "b": 2, "c": 1});
        let chart = PieChart::from_counts("phase_4", counts.as_object().unwrap()).unwrap();
        let last = chart.slices.last().unwrap();
        assert!((last.end_angle - 2.0 * PI).abs() < 1e-9);
        assert!(chart.slices[1].svg_path(100.0, 100.0, 80.0).contains(" 0 0 1 "));
    }

    #[test]
    fn single_category_draws_closed_circle() {
        let counts = json!({"Virus": 10});
        let chart = PieChart::from_counts("phase_1", counts.as_object().unwrap()).unwrap();
        let path = chart.slices[0].svg_path(50.0, 50.0, 40.0);
        assert!(path.starts_with("M 50.000 10.000"));
        assert!(path.ends_with('Z'));
        assert_eq!(chart.slices[0].percentage, "100");
    }

    #[test]
    fn table_caps_rows_and_notes_total() {
        let rows: Vec<Value> = (0..150).map(|index| json!({"a": index, "b": null})).collect();
        let parsed = results(json!({"phases": {"phase_1": rows}}));
        let tables = parsed.tables();
        assert_eq!(tables.len(), 1);

        let table = &tables[0];
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.headers, vec!["A", "B"]);
        assert_eq!(table.rows.len(), 100);
        assert_eq!(table.rows[0], vec!["0", "-"]);
        let note = table.truncation_note().unwrap();
        assert!(note.contains("150"));
        assert!(note.starts_with("Showing first 100 of 150 results."));
    }

    #[test]
    fn short_table_has_no_note() {
        let rows = vec![
            json!({"sequence_id": "seq1", "prediction": "Virus", "confidence": 0.97}),
            json!({"sequence_id": "seq2", "prediction": null}),
        ];
        let table = ResultTable::from_rows("phase_1", &rows).unwrap();
        assert_eq!(table.headers, vec!["Sequence Id", "Prediction", "Confidence"]);
        assert_eq!(table.rows[1], vec!["seq2", "-", ""]);
        assert_eq!(table.truncation_note(), None);
    }

    #[test]
    fn whole_float_cells_render_without_fraction() {
        let rows = vec![json!({"sequence_id": "s1", "probability": 1.0, "score": 0.5})];
        let table = ResultTable::from_rows("phase_1", &rows).unwrap();
        assert_eq!(table.rows[0], vec!["s1", "1", "0.5"]);
    }

    #[test]
    fn empty_phases_render_nothing() {
        let parsed = results(json!({"phases": {"phase_1": [], "phase_2": null}}));
        assert!(parsed.tables().is_empty());
        assert!(parsed.charts().is_empty());
    }

    #[test]
    fn total_sequences_only_when_non_zero() {
        let parsed = results(json!({"statistics_summary": {"total_sequences": 12}}));
        assert_eq!(parsed.total_sequences().as_deref(), Some("12"));
        let parsed = results(json!({"statistics_summary": {"total_sequences": 0}}));
        assert_eq!(parsed.total_sequences(), None);
        assert_eq!(JobResults::default().total_sequences(), None);
    }

    #[test]
    fn download_links_are_keyed_by_job_and_format() {
        let urls: Vec<String> = DownloadFormat::ALL
            .iter()
            .map(|format| format.url("abc"))
            .collect();
        assert_eq!(
            urls,
            vec![
                "/api/download/abc/csv",
                "/api/download/abc/excel",
                "/api/download/abc/pdf"
            ]
        );
        assert_eq!(DownloadFormat::Excel.link_id(), "download_excel");
    }
}
