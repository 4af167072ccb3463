//! Error types for series construction and derived-metric computation.

use thiserror::Error;

/// Errors raised by the calculator and by series/table construction.
///
/// Division by zero is not an error: percent changes coerce to 0 and
/// ratios come back as `None` (see [`crate::calc::ratio`]).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetricsError {
    #[error("series '{series}' has no periods")]
    EmptySeries { series: String },

    #[error("invalid range [{start}, {end}] for series of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("unknown period '{label}' in '{series}'")]
    UnknownPeriod { series: String, label: String },

    #[error("duplicate period '{label}' in '{series}'")]
    DuplicatePeriod { series: String, label: String },

    #[error("moving average window must be at least 1 (got {0})")]
    InvalidWindow(usize),

    #[error("'{series}' has {labels} labels but {values} values")]
    LengthMismatch {
        series: String,
        labels: usize,
        values: usize,
    },
}
