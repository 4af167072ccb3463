use std::fs;

use railkpi_core::{CsvProvider, MetricKey, SampleProvider, SeriesProvider};
use railkpi_runner::{
    export_comparison_csv, export_series_csv, export_table_csv, load_page_artifacts, render_page,
    save_page_artifacts, DashboardConfig, PageRequest,
};

#[test]
fn artifacts_roundtrip_through_disk() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = DashboardConfig::builtin();
    let request = PageRequest::new(MetricKey::OnTimePerformance)
        .between("Apr", "Sep")
        .with_moving_average(Some(2));
    let report = render_page(
        &SampleProvider::new(),
        &config.page(MetricKey::OnTimePerformance),
        &request,
    )
    .unwrap();

    let dir = save_page_artifacts(&report, temp_dir.path()).unwrap();
    let dirname = dir.file_name().unwrap().to_string_lossy().to_string();
    assert!(dirname.starts_with("on-time-performance_"));
    assert!(dir.join("report.json").exists());

    let series_csv = fs::read_to_string(dir.join("series.csv")).unwrap();
    assert!(series_csv.starts_with("month,value\nApr,91.3\n"));
    assert_eq!(series_csv.lines().count(), 7);

    let loaded = load_page_artifacts(&dir).unwrap();
    assert_eq!(loaded, report);
    assert_eq!(loaded.overlay.as_ref().map(Vec::len), Some(6));
}

#[test]
fn exported_files_serve_as_a_data_source() {
    let temp_dir = tempfile::tempdir().unwrap();
    let sample = SampleProvider::new();
    let csv = CsvProvider::new(temp_dir.path());

    for key in MetricKey::series_keys() {
        let text = export_series_csv(&sample.full_series(key).unwrap()).unwrap();
        fs::write(csv.path_for(key), text).unwrap();
    }
    let text = export_comparison_csv(&sample.comparison(MetricKey::ProactiveIndicators).unwrap())
        .unwrap();
    fs::write(csv.path_for(MetricKey::ProactiveIndicators), text).unwrap();
    let text = export_table_csv(&sample.table(MetricKey::SafetyIncidents).unwrap()).unwrap();
    fs::write(csv.path_for(MetricKey::SafetyIncidents), text).unwrap();

    let config = DashboardConfig::builtin();
    for key in MetricKey::series_keys() {
        let request = PageRequest::new(key).with_moving_average(None);
        let from_sample = render_page(&sample, &config.page(key), &request).unwrap();
        let from_csv = render_page(&csv, &config.page(key), &request).unwrap();
        assert_eq!(from_sample.derived, from_csv.derived, "{key}");
        assert_eq!(from_sample.series, from_csv.series, "{key}");
    }

    let a = railkpi_runner::build_overview(&sample).unwrap();
    let b = railkpi_runner::build_overview(&csv).unwrap();
    assert_eq!(a.insights, b.insights);
}

#[test]
fn config_file_drives_page_window() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("railkpi.toml");
    fs::write(
        &path,
        "[[pages]]\nmetric_key = \"derailment-rate\"\ndefault_window = 12\n",
    )
    .unwrap();

    let config = DashboardConfig::from_file(&path).unwrap();
    let request = PageRequest::new(MetricKey::DerailmentRate).with_moving_average(None);
    let report = render_page(
        &SampleProvider::new(),
        &config.page(MetricKey::DerailmentRate),
        &request,
    )
    .unwrap();
    assert_eq!(report.derived.window, 12);
    let overlay = report.overlay.unwrap();
    assert!((overlay[11] - report.derived.period_average).abs() < 1e-12);
}
