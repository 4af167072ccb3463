//! Period-over-period delta at the end of a range.

use serde::{Deserialize, Serialize};

use super::ratio::safe_pct_change;
use crate::domain::{MetricSeries, PeriodRange};
use crate::error::MetricsError;

/// Current vs previous value at the end of a range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaMetrics {
    /// Last value in the range.
    pub current: f64,
    /// Second-to-last value, or `current` for a single-period range.
    pub previous: f64,
    pub delta: f64,
    /// `delta / previous * 100`; 0 when `previous` is 0.
    pub delta_pct: f64,
}

/// Compute the delta for `range` (the full series when `None`).
pub fn delta(series: &MetricSeries, range: Option<PeriodRange>) -> Result<DeltaMetrics, MetricsError> {
    let r = series.resolve(range)?;
    let values = series.values();
    let current = values[r.end];
    let previous = if r.is_single() { current } else { values[r.end - 1] };
    Ok(DeltaMetrics {
        current,
        previous,
        delta: current - previous,
        delta_pct: safe_pct_change(current, previous),
    })
}
