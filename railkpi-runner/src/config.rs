//! Dashboard configuration: per-page settings and the optional map source.
//!
//! ```toml
//! [[pages]]
//! metric_key = "terminal-dwell"
//! default_window = 4
//!
//! [pages.colors]
//! line = "#FFB300"
//! fill = "rgba(255,179,0,0.1)"
//! background = "#FFFDF5"
//!
//! [geo]
//! boundaries_url = "https://example.org/indonesia-provinces.geojson"
//! timeout_secs = 30
//! max_retries = 3
//!
//! [geo.palette]
//! "Jawa Barat" = "#E5FF00"
//! ```
//!
//! Pages not listed fall back to built-in defaults.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use railkpi_core::geo::{
    source_with_settings, BoundarySource, GeoError, DEFAULT_MAX_RETRIES, MAX_RETRIES_LIMIT,
};
use railkpi_core::{MetricKey, MetricShape, Palette, DEFAULT_WINDOW};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("page '{0}': default_window must be at least 1")]
    ZeroWindow(MetricKey),

    #[error("page '{0}' is configured more than once")]
    DuplicatePage(MetricKey),

    #[error("'{0}' is not a time-series metric and has no page")]
    NotASeries(MetricKey),

    #[error("geo.timeout_secs must be at least 1")]
    ZeroTimeout,

    #[error("geo.max_retries must be at most {max} (got {got})")]
    TooManyRetries { got: u32, max: u32 },
}

// ─── Pages ──────────────────────────────────────────────────────────

/// Chart colours for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub line: String,
    pub fill: String,
    pub background: String,
}

impl ColorScheme {
    pub fn new(line: &str, fill: &str, background: &str) -> Self {
        Self {
            line: line.to_string(),
            fill: fill.to_string(),
            background: background.to_string(),
        }
    }

    /// Built-in colours for a metric's page.
    pub fn default_for(key: MetricKey) -> Self {
        match key {
            MetricKey::DerailmentRate => Self::new("#ED6B23", "rgba(237,107,35,0.1)", "#FFF7F2"),
            // line = available slice, fill = in-maintenance slice
            MetricKey::LocomotiveAvailability => Self::new("#3BA55D", "#355C7D", "#F8FFF9"),
            MetricKey::OnTimePerformance => Self::new("#2D2A70", "#EEF2FF", "#EEF2FF"),
            MetricKey::TerminalDwell => Self::new("#FFB300", "rgba(255,179,0,0.1)", "#FFFDF5"),
            MetricKey::ProactiveIndicators => Self::new("#2D2A70", "#3BA55D", "#F7FCFB"),
            MetricKey::SafetyIncidents => Self::new("#ED6B23", "#2D2A70", "#000000"),
        }
    }
}

/// Settings that drive the single page render path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PageEntry")]
pub struct PageConfig {
    pub metric_key: MetricKey,
    pub default_window: usize,
    #[serde(rename = "colors")]
    pub color_scheme: ColorScheme,
}

/// On-disk form: colours and window are optional.
#[derive(Deserialize)]
struct PageEntry {
    metric_key: MetricKey,
    #[serde(default)]
    default_window: Option<usize>,
    #[serde(default)]
    colors: Option<ColorScheme>,
}

impl From<PageEntry> for PageConfig {
    fn from(e: PageEntry) -> Self {
        Self {
            metric_key: e.metric_key,
            color_scheme: e
                .colors
                .unwrap_or_else(|| ColorScheme::default_for(e.metric_key)),
            default_window: e.default_window.unwrap_or(DEFAULT_WINDOW),
        }
    }
}

impl PageConfig {
    pub fn default_for(key: MetricKey) -> Self {
        Self {
            metric_key: key,
            color_scheme: ColorScheme::default_for(key),
            default_window: DEFAULT_WINDOW,
        }
    }
}

// ─── Geo ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoConfig {
    /// URL or local path of the boundary GeoJSON.
    pub boundaries_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Region name → colour. Empty means the built-in three-province palette.
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl GeoConfig {
    pub fn new(boundaries_url: impl Into<String>) -> Self {
        Self {
            boundaries_url: boundaries_url.into(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            palette: BTreeMap::new(),
        }
    }

    pub fn palette(&self) -> Palette {
        if self.palette.is_empty() {
            return Palette::default();
        }
        self.palette
            .iter()
            .fold(Palette::new(), |p, (region, color)| p.with(region, color.as_str()))
    }

    /// Boundary source for `boundaries_url`, honouring timeout and retry settings.
    pub fn source(&self) -> Result<Box<dyn BoundarySource>, GeoError> {
        source_with_settings(
            &self.boundaries_url,
            Duration::from_secs(self.timeout_secs),
            self.max_retries,
        )
    }
}

// ─── Dashboard ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub pages: Vec<PageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoConfig>,
}

impl DashboardConfig {
    /// Every time-series page with its built-in settings.
    pub fn builtin() -> Self {
        Self {
            pages: MetricKey::series_keys().map(PageConfig::default_for).collect(),
            geo: None,
        }
    }

    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for page in &self.pages {
            if page.metric_key.info().shape != MetricShape::Series {
                return Err(ConfigError::NotASeries(page.metric_key));
            }
            if page.default_window == 0 {
                return Err(ConfigError::ZeroWindow(page.metric_key));
            }
            if !seen.insert(page.metric_key) {
                return Err(ConfigError::DuplicatePage(page.metric_key));
            }
        }
        if let Some(geo) = &self.geo {
            if geo.timeout_secs == 0 {
                return Err(ConfigError::ZeroTimeout);
            }
            if geo.max_retries > MAX_RETRIES_LIMIT {
                return Err(ConfigError::TooManyRetries {
                    got: geo.max_retries,
                    max: MAX_RETRIES_LIMIT,
                });
            }
        }
        Ok(())
    }

    /// Settings for `key`: the configured page, else the built-in one.
    pub fn page(&self, key: MetricKey) -> PageConfig {
        self.pages
            .iter()
            .find(|p| p.metric_key == key)
            .cloned()
            .unwrap_or_else(|| PageConfig::default_for(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_builtin_pages() {
        let c = DashboardConfig::from_toml("").unwrap();
        assert!(c.pages.is_empty());
        let dwell = c.page(MetricKey::TerminalDwell);
        assert_eq!(dwell.default_window, 3);
        assert_eq!(dwell.color_scheme.line, "#FFB300");
    }

    #[test]
    fn page_entry_fills_missing_fields() {
        let c = DashboardConfig::from_toml(
            r#"
            [[pages]]
            metric_key = "derailment-rate"
            default_window = 6
            "#,
        )
        .unwrap();
        let p = c.page(MetricKey::DerailmentRate);
        assert_eq!(p.default_window, 6);
        assert_eq!(p.color_scheme, ColorScheme::default_for(MetricKey::DerailmentRate));
    }

    #[test]
    fn explicit_colors_override_defaults() {
        let c = DashboardConfig::from_toml(
            r##"
            [[pages]]
            metric_key = "on-time-performance"

            [pages.colors]
            line = "#000000"
            fill = "#111111"
            background = "#222222"
            "##,
        )
        .unwrap();
        let p = c.page(MetricKey::OnTimePerformance);
        assert_eq!(p.color_scheme, ColorScheme::new("#000000", "#111111", "#222222"));
        assert_eq!(p.default_window, DEFAULT_WINDOW);
    }

    #[test]
    fn zero_window_is_rejected() {
        let err = DashboardConfig::from_toml(
            "[[pages]]\nmetric_key = \"terminal-dwell\"\ndefault_window = 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroWindow(MetricKey::TerminalDwell)));
    }

    #[test]
    fn duplicate_page_is_rejected() {
        let toml = "[[pages]]\nmetric_key = \"terminal-dwell\"\n[[pages]]\nmetric_key = \"terminal-dwell\"\n";
        let err = DashboardConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePage(_)));
    }

    #[test]
    fn non_series_page_is_rejected() {
        let err = DashboardConfig::from_toml("[[pages]]\nmetric_key = \"safety-incidents\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotASeries(MetricKey::SafetyIncidents)));
    }

    #[test]
    fn unknown_metric_is_parse_error() {
        let err = DashboardConfig::from_toml("[[pages]]\nmetric_key = \"fuel-burn\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = DashboardConfig::builtin();
        let mut geo = GeoConfig::new("boundaries.geojson");
        geo.palette.insert("Jawa Barat".into(), "#E5FF00".into());
        c.geo = Some(geo);

        let text = c.to_toml().unwrap();
        let parsed = DashboardConfig::from_toml(&text).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn geo_defaults_and_palette() {
        let c = DashboardConfig::from_toml("[geo]\nboundaries_url = \"b.geojson\"\n").unwrap();
        let geo = c.geo.unwrap();
        assert_eq!(geo.timeout_secs, 30);
        assert_eq!(geo.max_retries, 3);
        assert_eq!(geo.palette(), Palette::default());
        assert_eq!(geo.source().unwrap().describe(), "b.geojson");
    }

    #[test]
    fn geo_source_dispatches_on_scheme() {
        let mut geo = GeoConfig::new("https://example.org/provinces.geojson");
        geo.timeout_secs = 5;
        assert_eq!(geo.source().unwrap().describe(), "https://example.org/provinces.geojson");
    }

    #[test]
    fn zero_geo_timeout_is_rejected() {
        let err = DashboardConfig::from_toml("[geo]\nboundaries_url = \"b.geojson\"\ntimeout_secs = 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTimeout));
    }

    #[test]
    fn excessive_geo_retries_are_rejected() {
        let err = DashboardConfig::from_toml("[geo]\nboundaries_url = \"b.geojson\"\nmax_retries = 40\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::TooManyRetries { got: 40, max: 10 }));

        let ok = DashboardConfig::from_toml("[geo]\nboundaries_url = \"b.geojson\"\nmax_retries = 10\n");
        assert!(ok.is_ok());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DashboardConfig::from_file(Path::new("/no/such/railkpi.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
