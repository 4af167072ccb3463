//! RailKPI Core: domain types, derived metrics, series providers, geo join.
//!
//! This crate holds everything that is independent of page layout:
//! - Domain types (metric series, period ranges, comparisons, category tables)
//! - Derived-metrics calculator (delta, moving average, aggregate, ratio)
//! - Series providers (fixed sample data, CSV-backed directory)
//! - CSV codec shared by providers and export
//! - Province-name normalization and GeoJSON boundary join

pub mod calc;
pub mod data;
pub mod domain;
pub mod error;
pub mod geo;

pub use calc::{
    aggregate, delta, moving_average, moving_average_in, ratio, safe_pct_change, Aggregate,
    DeltaMetrics, DerivedMetrics, MovingAverage, Trend, DEFAULT_WINDOW,
};
pub use data::{CsvProvider, DataError, SampleProvider, SeriesProvider};
pub use domain::{
    CategoryTable, ComparisonRow, IndicatorComparison, LabelRange, MetricInfo, MetricKey,
    MetricSeries, MetricShape, PeriodKind, PeriodRange, RegionalIndicator,
};
pub use error::MetricsError;
pub use geo::{
    feature_fills, join_rows, normalize_name, BoundaryIndex, BoundarySource, FeatureCollection,
    GeoError, Palette,
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Report records cross into whatever presentation layer consumes them.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<MetricSeries>();
        require_sync::<MetricSeries>();
        require_send::<IndicatorComparison>();
        require_sync::<IndicatorComparison>();
        require_send::<CategoryTable>();
        require_sync::<CategoryTable>();
        require_send::<DerivedMetrics>();
        require_sync::<DerivedMetrics>();
        require_send::<SampleProvider>();
        require_sync::<SampleProvider>();
        require_send::<CsvProvider>();
        require_sync::<CsvProvider>();
        require_send::<FeatureCollection>();
        require_sync::<FeatureCollection>();
        require_send::<geo::HttpBoundarySource>();
        require_sync::<geo::HttpBoundarySource>();
    }

    #[test]
    fn provider_trait_is_object_safe() {
        fn _check(provider: &dyn SeriesProvider) -> Result<MetricSeries, DataError> {
            provider.series(MetricKey::DerailmentRate, None)
        }
        let provider = SampleProvider::new();
        assert!(_check(&provider).is_ok());
    }
}
