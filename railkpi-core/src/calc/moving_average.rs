//! Trailing moving average with partial windows at the start.
//!
//! Unlike a classic SMA there is no warmup: point `i` is the mean of
//! `values[max(0, i - window + 1)..=i]`, so the output is as long as the
//! input and never padded.

use std::iter::FusedIterator;

use crate::domain::{MetricSeries, PeriodRange};
use crate::error::MetricsError;

/// Window used when a page does not ask for one.
pub const DEFAULT_WINDOW: usize = 3;

/// Lazy trailing-mean iterator over a borrowed slice.
///
/// Cloning yields an independent iterator from the current position;
/// cloning a fresh one restarts the sequence.
#[derive(Debug, Clone)]
pub struct MovingAverage<'a> {
    values: &'a [f64],
    window: usize,
    index: usize,
}

impl<'a> MovingAverage<'a> {
    /// Trailing mean over an arbitrary slice. `window` must be at least 1.
    pub fn over(values: &'a [f64], window: usize) -> Result<Self, MetricsError> {
        if window == 0 {
            return Err(MetricsError::InvalidWindow(window));
        }
        Ok(Self {
            values,
            window,
            index: 0,
        })
    }

    /// A fresh iterator over the same input.
    pub fn restart(&self) -> Self {
        Self {
            index: 0,
            ..self.clone()
        }
    }
}

impl Iterator for MovingAverage<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.index >= self.values.len() {
            return None;
        }
        let end = self.index;
        let start = (end + 1).saturating_sub(self.window);
        let window = &self.values[start..=end];
        self.index += 1;
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.values.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for MovingAverage<'_> {}

impl FusedIterator for MovingAverage<'_> {}

/// Moving average over the whole series. An empty series yields an empty sequence.
pub fn moving_average(series: &MetricSeries, window: usize) -> Result<MovingAverage<'_>, MetricsError> {
    MovingAverage::over(series.values(), window)
}

/// Moving average restricted to `range`; the window never reaches before `range.start`.
pub fn moving_average_in(
    series: &MetricSeries,
    range: Option<PeriodRange>,
    window: usize,
) -> Result<MovingAverage<'_>, MetricsError> {
    let values = series.values_in(range)?;
    MovingAverage::over(values, window)
}
