//! Series provider trait and structured error types.
//!
//! The SeriesProvider trait abstracts over where KPI data comes from (fixed
//! sample data, exported CSV files) so pages can be rendered against any
//! source and tests can swap in their own.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{
    CategoryTable, IndicatorComparison, LabelRange, MetricKey, MetricSeries, MetricShape,
    RegionalIndicator,
};
use crate::error::MetricsError;

/// Structured error types for data access.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("metric '{key}' is not available from {provider}")]
    UnknownMetric { key: MetricKey, provider: String },

    #[error("metric '{key}' is a {actual} metric, not a {expected} metric")]
    WrongShape {
        key: MetricKey,
        expected: MetricShape,
        actual: MetricShape,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed data: {0}")]
    Malformed(String),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

impl DataError {
    /// Shape guard used by providers before building a series/comparison/table.
    pub fn check_shape(key: MetricKey, expected: MetricShape) -> Result<(), DataError> {
        let actual = key.info().shape;
        if actual != expected {
            return Err(DataError::WrongShape {
                key,
                expected,
                actual,
            });
        }
        Ok(())
    }
}

/// Source of KPI data: "given a metric key and a time range, return an ordered series".
///
/// Implementations supply full series; range selection is shared and happens
/// in [`series`](SeriesProvider::series).
pub trait SeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// The complete series for a time-series metric.
    fn full_series(&self, key: MetricKey) -> Result<MetricSeries, DataError>;

    /// This-period vs last-period data for a comparison metric.
    fn comparison(&self, key: MetricKey) -> Result<IndicatorComparison, DataError>;

    /// Period × category data for a table metric.
    fn table(&self, key: MetricKey) -> Result<CategoryTable, DataError>;

    /// Per-region readings behind a comparison metric, for the map view.
    fn regional(&self, key: MetricKey) -> Result<Vec<RegionalIndicator>, DataError> {
        Err(DataError::UnknownMetric {
            key,
            provider: self.name().to_string(),
        })
    }

    /// The series for `key`, cut to `range` when one is given.
    fn series(&self, key: MetricKey, range: Option<&LabelRange>) -> Result<MetricSeries, DataError> {
        let full = self.full_series(key)?;
        match range {
            Some(r) if !r.is_unbounded() => {
                let idx = r.resolve(&full)?;
                Ok(full.slice(idx)?)
            }
            _ => Ok(full),
        }
    }
}
