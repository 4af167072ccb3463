//! Domain types for RailKPI

pub mod comparison;
pub mod metric;
pub mod series;
pub mod table;

pub use comparison::{ComparisonRow, IndicatorComparison, RegionalIndicator};
pub use metric::{MetricInfo, MetricKey, MetricShape};
pub use series::{LabelRange, MetricSeries, PeriodKind, PeriodRange};
pub use table::CategoryTable;
