//! Export: CSV for series, comparisons and tables; JSON for reports.
//!
//! CSV layouts come from the core codec so exported files can be read back
//! by `CsvProvider`. JSON reports carry a `schema_version`; newer versions
//! are rejected on import.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use railkpi_core::data::csv_codec;
use railkpi_core::{CategoryTable, IndicatorComparison, MetricSeries};

use crate::overview::{OverviewReport, SafetyQuarterView};
use crate::page::{PageReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &PageReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize PageReport to JSON")
}

/// Deserialize a `PageReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<PageReport> {
    let report: PageReport =
        serde_json::from_str(json).context("failed to deserialize PageReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

pub fn export_overview_json(report: &OverviewReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize OverviewReport to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// `<label column>,value`, one row per period.
pub fn export_series_csv(series: &MetricSeries) -> Result<String> {
    let mut buf = Vec::new();
    csv_codec::write_series(series, &mut buf)
        .with_context(|| format!("failed to write series '{}' as CSV", series.name()))?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

pub fn import_series_csv(name: &str, csv: &str) -> Result<MetricSeries> {
    csv_codec::read_series(name, csv.as_bytes())
        .with_context(|| format!("failed to read series '{name}' from CSV"))
}

/// `category,last,this,change,pct_change,ratio`.
pub fn export_comparison_csv(comparison: &IndicatorComparison) -> Result<String> {
    let mut buf = Vec::new();
    csv_codec::write_comparison(comparison, &mut buf)
        .with_context(|| format!("failed to write comparison '{}' as CSV", comparison.name()))?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// `<Period>,Category,Value`, one row per period × category.
pub fn export_table_csv(table: &CategoryTable) -> Result<String> {
    let mut buf = Vec::new();
    csv_codec::write_table(table, &mut buf)
        .with_context(|| format!("failed to write table '{}' as CSV", table.name()))?;
    String::from_utf8(buf).context("CSV output is not valid UTF-8")
}

/// One quarter in table layout, as the safety page offers for download.
pub fn export_quarter_csv(view: &SafetyQuarterView) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Quarter", "Category", "Value"])?;
    for (category, value) in view.counts.points() {
        wtr.write_record([view.quarter.as_str(), category, &value.to_string()])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save a page report as `{metric}_{timestamp}/` under `output_dir`:
/// - `report.json`: the full `PageReport`
/// - `series.csv`: the rendered series
///
/// Returns the path to the created directory.
pub fn save_page_artifacts(report: &PageReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        report.metric_key,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    let json_path = run_dir.join("report.json");
    std::fs::write(&json_path, &json)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    let series_csv = export_series_csv(&report.series)?;
    let csv_path = run_dir.join("series.csv");
    std::fs::write(&csv_path, &series_csv)
        .with_context(|| format!("failed to write {}", csv_path.display()))?;

    info!(metric = %report.metric_key, dir = %run_dir.display(), "saved page artifacts");
    Ok(run_dir)
}

/// Load a `PageReport` from an artifact directory's report.json.
pub fn load_page_artifacts(dir: &Path) -> Result<PageReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use crate::overview::safety_quarter;
    use crate::page::{render_page, PageRequest};
    use railkpi_core::{MetricKey, SampleProvider, SeriesProvider};

    fn dwell_report() -> PageReport {
        let req = PageRequest::new(MetricKey::TerminalDwell).with_moving_average(None);
        render_page(
            &SampleProvider::new(),
            &PageConfig::default_for(MetricKey::TerminalDwell),
            &req,
        )
        .unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let report = dwell_report();
        let json = export_json(&report).unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        assert_eq!(import_json(&json).unwrap(), report);
    }

    #[test]
    fn newer_schema_is_rejected() {
        let mut report = dwell_report();
        report.schema_version = SCHEMA_VERSION + 1;
        let json = export_json(&report).unwrap();
        let err = import_json(&json).unwrap_err();
        assert!(err.to_string().contains("unsupported schema version"));
    }

    #[test]
    fn series_csv_header_and_rows() {
        let csv = export_series_csv(&dwell_report().series).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "month,value");
        assert_eq!(lines[1], "Jan,27.5");
        assert_eq!(lines.len(), 13);
    }

    #[test]
    fn series_csv_roundtrip() {
        let series = dwell_report().series;
        let csv = export_series_csv(&series).unwrap();
        assert_eq!(import_series_csv(series.name(), &csv).unwrap(), series);
    }

    #[test]
    fn table_csv_layout() {
        let table = SampleProvider::new().table(MetricKey::SafetyIncidents).unwrap();
        let csv = export_table_csv(&table).unwrap();
        assert!(csv.starts_with("Quarter,Category,Value\nQuarter 1,Derailments,5\n"));
        assert_eq!(csv.lines().count(), 17);
    }

    #[test]
    fn quarter_csv_layout() {
        let table = SampleProvider::new().table(MetricKey::SafetyIncidents).unwrap();
        let view = safety_quarter(&table, None).unwrap();
        let csv = export_quarter_csv(&view).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Quarter,Category,Value");
        assert_eq!(lines[1], "Quarter 3,Derailments,4");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn comparison_csv_has_ratio_column() {
        let cmp = SampleProvider::new()
            .comparison(MetricKey::ProactiveIndicators)
            .unwrap();
        let csv = export_comparison_csv(&cmp).unwrap();
        assert!(csv.starts_with("category,last,this,change,pct_change,ratio\n"));
        assert!(csv.contains("Signal Failures,50.0,45.0,-5.0,-10.0,0.9"));
    }
}
