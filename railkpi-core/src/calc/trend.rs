//! Direction of change between the first and last value of a window.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::MetricSeries;
use crate::error::MetricsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Flat,
}

impl Trend {
    pub fn between(first: f64, last: f64) -> Self {
        if last > first {
            Trend::Increasing
        } else if last < first {
            Trend::Decreasing
        } else {
            Trend::Flat
        }
    }

    /// Trend from the first to the last period of a non-empty series.
    pub fn of_series(series: &MetricSeries) -> Result<Self, MetricsError> {
        match (series.first(), series.last()) {
            (Some((_, first)), Some((_, last))) => Ok(Self::between(first, last)),
            _ => Err(MetricsError::EmptySeries {
                series: series.name().to_string(),
            }),
        }
    }

    /// Whether this direction is an improvement for a metric.
    pub fn is_improvement(self, lower_is_better: bool) -> bool {
        match self {
            Trend::Flat => false,
            Trend::Increasing => !lower_is_better,
            Trend::Decreasing => lower_is_better,
        }
    }

    /// Short word for prose ("up" / "down" / "flat").
    pub fn direction_word(self) -> &'static str {
        match self {
            Trend::Increasing => "up",
            Trend::Decreasing => "down",
            Trend::Flat => "flat",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Increasing => "increasing",
            Trend::Decreasing => "decreasing",
            Trend::Flat => "flat",
        })
    }
}
