//! Metric keys and their static metadata.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which KPI a request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKey {
    DerailmentRate,
    LocomotiveAvailability,
    OnTimePerformance,
    TerminalDwell,
    ProactiveIndicators,
    SafetyIncidents,
}

/// Shape of the data behind a metric key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricShape {
    /// One value per period.
    Series,
    /// Paired this-period / last-period values per category.
    Comparison,
    /// Period × category matrix.
    Table,
}

impl fmt::Display for MetricShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetricShape::Series => "series",
            MetricShape::Comparison => "comparison",
            MetricShape::Table => "table",
        })
    }
}

/// Display metadata for a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricInfo {
    pub title: &'static str,
    pub unit: &'static str,
    /// Target threshold, if the metric is tracked against one.
    pub target: Option<f64>,
    /// True for metrics where a falling value is an improvement.
    pub lower_is_better: bool,
    pub shape: MetricShape,
}

impl MetricKey {
    pub const ALL: [MetricKey; 6] = [
        MetricKey::DerailmentRate,
        MetricKey::LocomotiveAvailability,
        MetricKey::OnTimePerformance,
        MetricKey::TerminalDwell,
        MetricKey::ProactiveIndicators,
        MetricKey::SafetyIncidents,
    ];

    /// Keys whose data is a single time series.
    pub fn series_keys() -> impl Iterator<Item = MetricKey> {
        Self::ALL
            .into_iter()
            .filter(|k| k.info().shape == MetricShape::Series)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MetricKey::DerailmentRate => "derailment-rate",
            MetricKey::LocomotiveAvailability => "locomotive-availability",
            MetricKey::OnTimePerformance => "on-time-performance",
            MetricKey::TerminalDwell => "terminal-dwell",
            MetricKey::ProactiveIndicators => "proactive-indicators",
            MetricKey::SafetyIncidents => "safety-incidents",
        }
    }

    pub fn info(self) -> MetricInfo {
        match self {
            MetricKey::DerailmentRate => MetricInfo {
                title: "Derailment Rate",
                unit: "per million train-miles",
                target: None,
                lower_is_better: true,
                shape: MetricShape::Series,
            },
            MetricKey::LocomotiveAvailability => MetricInfo {
                title: "Locomotive Availability",
                unit: "%",
                target: None,
                lower_is_better: false,
                shape: MetricShape::Series,
            },
            MetricKey::OnTimePerformance => MetricInfo {
                title: "On-Time Performance",
                unit: "%",
                target: Some(90.0),
                lower_is_better: false,
                shape: MetricShape::Series,
            },
            MetricKey::TerminalDwell => MetricInfo {
                title: "Terminal Dwell Time",
                unit: "hours",
                target: None,
                lower_is_better: true,
                shape: MetricShape::Series,
            },
            MetricKey::ProactiveIndicators => MetricInfo {
                title: "Proactive Safety: Leading Indicators",
                unit: "events",
                target: None,
                lower_is_better: false,
                shape: MetricShape::Comparison,
            },
            MetricKey::SafetyIncidents => MetricInfo {
                title: "Safety Performance: Lagging Indicators",
                unit: "incidents",
                target: None,
                lower_is_better: true,
                shape: MetricShape::Table,
            },
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown metric '{s}'. Valid: {}", valid.join(", "))
            })
    }
}
