//! Derived-metrics calculator.
//!
//! Every function here is pure: series and range in, numbers out.
//! Ranges are validated up front; an empty series is always rejected before
//! any value is read.

pub mod aggregate;
pub mod delta;
pub mod derived;
pub mod moving_average;
pub mod ratio;
pub mod trend;

pub use aggregate::{aggregate, Aggregate};
pub use delta::{delta, DeltaMetrics};
pub use derived::DerivedMetrics;
pub use moving_average::{moving_average, moving_average_in, MovingAverage, DEFAULT_WINDOW};
pub use ratio::{ratio, safe_pct_change};
pub use trend::Trend;
