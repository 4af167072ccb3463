//! One render path for every time-series metric page.
//!
//! A page is a [`PageConfig`] (colours, default window) plus a
//! [`PageRequest`] (metric, optional label range, moving-average toggle).
//! [`render_page`] turns both into a [`PageReport`]: the selected series,
//! its derived metrics, the optional overlay, and the metric-specific
//! extras (target status, availability split).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use railkpi_core::{
    DataError, DerivedMetrics, LabelRange, MetricKey, MetricSeries, MetricShape, MetricsError,
    SeriesProvider, Trend,
};

use crate::config::{ColorScheme, PageConfig};

/// Current report schema version. Bump when PageReport fields change shape.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("'{0}' is not a time-series metric and has no page")]
    NotASeries(MetricKey),

    #[error("page config is for '{config}' but the request is for '{request}'")]
    ConfigMismatch { config: MetricKey, request: MetricKey },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

// ─── Request ────────────────────────────────────────────────────────

/// What the user asked a page for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub metric_key: MetricKey,
    /// First period label to show; the series start when absent.
    #[serde(default)]
    pub from: Option<String>,
    /// Last period label to show; the series end when absent.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub show_moving_average: bool,
    /// Moving-average window; the page default when absent.
    #[serde(default)]
    pub window: Option<usize>,
}

impl PageRequest {
    pub fn new(metric_key: MetricKey) -> Self {
        Self {
            metric_key,
            from: None,
            to: None,
            show_moving_average: false,
            window: None,
        }
    }

    pub fn between(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self.to = Some(to.into());
        self
    }

    pub fn with_moving_average(mut self, window: Option<usize>) -> Self {
        self.show_moving_average = true;
        self.window = window;
        self
    }

    pub fn label_range(&self) -> LabelRange {
        LabelRange::new(self.from.clone(), self.to.clone())
    }

    /// Window to use under `config`, checked to be at least 1.
    pub fn effective_window(&self, config: &PageConfig) -> Result<usize, PageError> {
        let window = self.window.unwrap_or(config.default_window);
        if window == 0 {
            return Err(MetricsError::InvalidWindow(window).into());
        }
        Ok(window)
    }

    /// Checks everything that does not need the data itself.
    pub fn validate(&self, config: &PageConfig) -> Result<usize, PageError> {
        if self.metric_key.info().shape != MetricShape::Series {
            return Err(PageError::NotASeries(self.metric_key));
        }
        if config.metric_key != self.metric_key {
            return Err(PageError::ConfigMismatch {
                config: config.metric_key,
                request: self.metric_key,
            });
        }
        self.effective_window(config)
    }

    /// Deterministic id for this request against a provider.
    ///
    /// Two requests with the same metric, range, toggle and window against
    /// the same provider share an id.
    pub fn report_id(&self, provider: &str, window: usize) -> String {
        let key = format!(
            "{provider}|{}|{}|{}|{}|{window}",
            self.metric_key,
            self.from.as_deref().unwrap_or(""),
            self.to.as_deref().unwrap_or(""),
            self.show_moving_average,
        );
        blake3::hash(key.as_bytes()).to_hex().to_string()
    }
}

// ─── Report ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Met,
    Missed,
}

/// Latest value against a metric's target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetCheck {
    pub target: f64,
    pub current: f64,
    /// Distance past the target in the metric's good direction; negative when missed.
    pub margin: f64,
    pub status: TargetStatus,
}

impl TargetCheck {
    pub fn evaluate(target: f64, current: f64, lower_is_better: bool) -> Self {
        let margin = if lower_is_better {
            target - current
        } else {
            current - target
        };
        let status = if margin >= 0.0 {
            TargetStatus::Met
        } else {
            TargetStatus::Missed
        };
        Self {
            target,
            current,
            margin,
            status,
        }
    }
}

/// Fleet split for the availability donut.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySplit {
    pub available: f64,
    pub in_maintenance: f64,
}

impl AvailabilitySplit {
    pub fn from_percent(available: f64) -> Self {
        Self {
            available,
            in_maintenance: 100.0 - available,
        }
    }
}

/// Everything a metric page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub schema_version: u32,
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub provider: String,
    pub metric_key: MetricKey,
    pub title: String,
    pub unit: String,
    pub colors: ColorScheme,
    /// The series cut to the requested range.
    pub series: MetricSeries,
    pub derived: DerivedMetrics,
    /// Moving average to draw over the series, when requested.
    pub overlay: Option<Vec<f64>>,
    pub trend: Trend,
    pub target: Option<TargetCheck>,
    pub availability: Option<AvailabilitySplit>,
}

impl PageReport {
    pub fn label(&self) -> String {
        format!("{} ({})", self.title, self.unit)
    }
}

/// Render one metric page.
pub fn render_page(
    provider: &dyn SeriesProvider,
    config: &PageConfig,
    request: &PageRequest,
) -> Result<PageReport, PageError> {
    let window = request.validate(config)?;
    let key = request.metric_key;
    let info = key.info();

    let series = provider.series(key, Some(&request.label_range()))?;
    let derived = DerivedMetrics::compute(&series, None, window)?;
    let trend = Trend::of_series(&series)?;

    let overlay = request
        .show_moving_average
        .then(|| derived.moving_average.clone());
    let target = info
        .target
        .map(|t| TargetCheck::evaluate(t, derived.current, info.lower_is_better));
    let availability = (key == MetricKey::LocomotiveAvailability)
        .then(|| AvailabilitySplit::from_percent(derived.current));

    info!(
        metric = %key,
        provider = provider.name(),
        periods = series.len(),
        window,
        "rendered page"
    );

    Ok(PageReport {
        schema_version: SCHEMA_VERSION,
        report_id: request.report_id(provider.name(), window),
        generated_at: Utc::now(),
        provider: provider.name().to_string(),
        metric_key: key,
        title: info.title.to_string(),
        unit: info.unit.to_string(),
        colors: config.color_scheme.clone(),
        series,
        derived,
        overlay,
        trend,
        target,
        availability,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use railkpi_core::SampleProvider;

    fn render(request: PageRequest) -> Result<PageReport, PageError> {
        let config = PageConfig::default_for(request.metric_key);
        render_page(&SampleProvider::new(), &config, &request)
    }

    #[test]
    fn full_range_page() {
        let r = render(PageRequest::new(MetricKey::DerailmentRate)).unwrap();
        assert_eq!(r.schema_version, SCHEMA_VERSION);
        assert_eq!(r.series.len(), 12);
        assert_eq!(r.derived.current, 0.28);
        assert_eq!(r.derived.previous, 0.30);
        assert_eq!(r.trend, Trend::Decreasing);
        assert!(r.overlay.is_none());
        assert!(r.target.is_none());
        assert!(r.availability.is_none());
        assert_eq!(r.colors.line, "#ED6B23");
    }

    #[test]
    fn sub_range_with_overlay() {
        let r = render(
            PageRequest::new(MetricKey::DerailmentRate)
                .between("Jan", "Mar")
                .with_moving_average(None),
        )
        .unwrap();
        let overlay = r.overlay.unwrap();
        assert_eq!(overlay.len(), 3);
        assert!((overlay[0] - 0.45).abs() < 1e-10);
        assert!((overlay[1] - 0.44).abs() < 1e-10);
        assert!((overlay[2] - 0.43).abs() < 1e-10);
        assert_eq!(r.derived.current, 0.41);
    }

    #[test]
    fn on_time_target_is_met() {
        let r = render(PageRequest::new(MetricKey::OnTimePerformance)).unwrap();
        let t = r.target.unwrap();
        assert_eq!(t.target, 90.0);
        assert_eq!(t.status, TargetStatus::Met);
        assert!((t.margin - 2.5).abs() < 1e-9);
    }

    #[test]
    fn availability_split_sums_to_hundred() {
        let r = render(PageRequest::new(MetricKey::LocomotiveAvailability)).unwrap();
        let split = r.availability.unwrap();
        assert_eq!(split.available, 87.0);
        assert_eq!(split.in_maintenance, 13.0);
    }

    #[test]
    fn target_check_respects_direction() {
        assert_eq!(TargetCheck::evaluate(90.0, 89.0, false).status, TargetStatus::Missed);
        assert_eq!(TargetCheck::evaluate(25.0, 23.5, true).status, TargetStatus::Met);
        assert_eq!(TargetCheck::evaluate(90.0, 90.0, false).status, TargetStatus::Met);
    }

    #[test]
    fn zero_window_rejected_at_the_boundary() {
        let err = render(PageRequest::new(MetricKey::TerminalDwell).with_moving_average(Some(0)))
            .unwrap_err();
        assert!(matches!(err, PageError::Metrics(MetricsError::InvalidWindow(0))));
    }

    #[test]
    fn unknown_label_is_reported() {
        let err = render(PageRequest::new(MetricKey::TerminalDwell).between("Jan", "Month13"))
            .unwrap_err();
        assert!(matches!(
            err,
            PageError::Data(DataError::Metrics(MetricsError::UnknownPeriod { .. }))
        ));
    }

    #[test]
    fn non_series_metric_has_no_page() {
        let config = PageConfig::default_for(MetricKey::TerminalDwell);
        let err = render_page(
            &SampleProvider::new(),
            &config,
            &PageRequest::new(MetricKey::SafetyIncidents),
        )
        .unwrap_err();
        assert!(matches!(err, PageError::NotASeries(MetricKey::SafetyIncidents)));
    }

    #[test]
    fn config_must_match_request() {
        let config = PageConfig::default_for(MetricKey::TerminalDwell);
        let err = render_page(
            &SampleProvider::new(),
            &config,
            &PageRequest::new(MetricKey::DerailmentRate),
        )
        .unwrap_err();
        assert!(matches!(err, PageError::ConfigMismatch { .. }));
    }

    #[test]
    fn report_id_is_stable_and_request_sensitive() {
        let a = PageRequest::new(MetricKey::TerminalDwell);
        let b = a.clone().between("Jan", "Jun");
        assert_eq!(a.report_id("sample", 3), a.report_id("sample", 3));
        assert_ne!(a.report_id("sample", 3), b.report_id("sample", 3));
        assert_ne!(a.report_id("sample", 3), a.report_id("sample", 4));
        assert_eq!(a.report_id("sample", 3).len(), 64);
    }
}
