//! Sum / mean / min / max over a sub-range.

use serde::{Deserialize, Serialize};

use crate::domain::{MetricSeries, PeriodRange};
use crate::error::MetricsError;

/// Summary statistics over a contiguous set of periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Aggregate {
    /// Statistics over a slice. `None` for an empty slice.
    pub fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            count: values.len(),
            sum,
            mean: sum / values.len() as f64,
            min,
            max,
        })
    }
}

/// Aggregate `range` of `series` (the full series when `None`).
///
/// Fails with `EmptySeries` for an empty series and `InvalidRange` for a
/// reversed or out-of-bounds range.
pub fn aggregate(series: &MetricSeries, range: Option<PeriodRange>) -> Result<Aggregate, MetricsError> {
    let values = series.values_in(range)?;
    Aggregate::of(values).ok_or_else(|| MetricsError::EmptySeries {
        series: series.name().to_string(),
    })
}
