//! DerivedMetrics: everything a metric card and its chart need, in one pass.

use serde::{Deserialize, Serialize};

use super::aggregate::aggregate;
use super::delta::{delta, DeltaMetrics};
use super::moving_average::moving_average_in;
use crate::domain::{MetricSeries, PeriodRange};
use crate::error::MetricsError;

/// Derived values for one series over one range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub range: PeriodRange,
    pub current: f64,
    pub previous: f64,
    pub delta: f64,
    pub delta_pct: f64,
    /// Mean over the range.
    pub period_average: f64,
    /// Trailing mean per period inside the range, same length as the range.
    pub moving_average: Vec<f64>,
    pub window: usize,
    pub range_min: f64,
    pub range_max: f64,
}

impl DerivedMetrics {
    pub fn compute(
        series: &MetricSeries,
        range: Option<PeriodRange>,
        window: usize,
    ) -> Result<Self, MetricsError> {
        let range = series.resolve(range)?;
        let DeltaMetrics {
            current,
            previous,
            delta,
            delta_pct,
        } = delta(series, Some(range))?;
        let agg = aggregate(series, Some(range))?;
        let moving_average = moving_average_in(series, Some(range), window)?.collect();
        Ok(Self {
            range,
            current,
            previous,
            delta,
            delta_pct,
            period_average: agg.mean,
            moving_average,
            window,
            range_min: agg.min,
            range_max: agg.max,
        })
    }

    pub fn delta_metrics(&self) -> DeltaMetrics {
        DeltaMetrics {
            current: self.current,
            previous: self.previous,
            delta: self.delta,
            delta_pct: self.delta_pct,
        }
    }
}
