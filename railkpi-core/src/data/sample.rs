//! Fixed sample data for every railway KPI.
//!
//! Twelve months of readings per time-series metric, a this-month vs
//! last-month table of proactive safety indicators, and four quarters of
//! lagging safety incident counts. Stands in for a real data source.

use tracing::debug;

use super::provider::{DataError, SeriesProvider};
use crate::domain::{
    CategoryTable, ComparisonRow, IndicatorComparison, MetricKey, MetricSeries, MetricShape,
    PeriodKind, RegionalIndicator,
};

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Derailments per million train-miles.
const DERAILMENT_RATE: [f64; 12] = [
    0.45, 0.43, 0.41, 0.39, 0.36, 0.38, 0.40, 0.37, 0.35, 0.33, 0.30, 0.28,
];

/// Percent of the locomotive fleet available for service.
const LOCOMOTIVE_AVAILABILITY: [f64; 12] = [
    82.0, 83.0, 84.0, 85.0, 85.0, 86.0, 86.0, 87.0, 86.0, 87.0, 88.0, 87.0,
];

/// Percent of shipments delivered within the scheduled window.
const ON_TIME_PERFORMANCE: [f64; 12] = [
    90.1, 90.5, 91.0, 91.3, 91.7, 92.0, 92.3, 92.5, 92.1, 91.8, 92.0, 92.5,
];

/// Average hours a freight car sits idle at a terminal.
const TERMINAL_DWELL: [f64; 12] = [
    27.5, 27.8, 27.6, 26.9, 26.4, 25.8, 25.0, 24.7, 24.3, 23.9, 23.7, 23.5,
];

/// (indicator, last month, this month)
const PROACTIVE: [(&str, f64, f64); 3] = [
    ("Track Defects Found", 120.0, 130.0),
    ("Signal Failures", 50.0, 45.0),
    ("Close Calls Reported", 90.0, 100.0),
];

/// Province where each proactive indicator is concentrated.
const PROACTIVE_REGIONS: [&str; 3] = ["Jawa Barat", "Jawa Tengah", "Sumatera Utara"];

pub const QUARTERS: [&str; 4] = ["Quarter 1", "Quarter 2", "Quarter 3", "Quarter 4"];

pub const SAFETY_CATEGORIES: [&str; 4] = [
    "Derailments",
    "Collisions",
    "Highway-Rail Crossing Incidents",
    "Employee Reportable Injuries",
];

/// Incident counts per quarter, columns as in `SAFETY_CATEGORIES`.
const SAFETY_COUNTS: [[f64; 4]; 4] = [
    [5.0, 2.0, 11.0, 8.0],
    [3.0, 1.0, 8.0, 6.0],
    [4.0, 3.0, 9.0, 7.0],
    [2.0, 1.0, 5.0, 4.0],
];

/// Provider over the built-in sample data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleProvider;

impl SampleProvider {
    pub fn new() -> Self {
        Self
    }

    fn monthly(key: MetricKey) -> Option<&'static [f64; 12]> {
        match key {
            MetricKey::DerailmentRate => Some(&DERAILMENT_RATE),
            MetricKey::LocomotiveAvailability => Some(&LOCOMOTIVE_AVAILABILITY),
            MetricKey::OnTimePerformance => Some(&ON_TIME_PERFORMANCE),
            MetricKey::TerminalDwell => Some(&TERMINAL_DWELL),
            _ => None,
        }
    }
}

impl SeriesProvider for SampleProvider {
    fn name(&self) -> &str {
        "sample"
    }

    fn full_series(&self, key: MetricKey) -> Result<MetricSeries, DataError> {
        DataError::check_shape(key, MetricShape::Series)?;
        let values = Self::monthly(key).ok_or_else(|| DataError::UnknownMetric {
            key,
            provider: self.name().to_string(),
        })?;
        debug!(metric = %key, periods = values.len(), "loading sample series");
        Ok(MetricSeries::new(
            key.as_str(),
            PeriodKind::Month,
            MONTHS.iter().copied().zip(values.iter().copied()),
        )?)
    }

    fn comparison(&self, key: MetricKey) -> Result<IndicatorComparison, DataError> {
        DataError::check_shape(key, MetricShape::Comparison)?;
        let rows = PROACTIVE
            .iter()
            .map(|&(category, last, this)| ComparisonRow::new(category, last, this))
            .collect();
        Ok(IndicatorComparison::new(key.as_str(), rows)?)
    }

    fn table(&self, key: MetricKey) -> Result<CategoryTable, DataError> {
        DataError::check_shape(key, MetricShape::Table)?;
        Ok(CategoryTable::new(
            key.as_str(),
            PeriodKind::Quarter,
            QUARTERS.iter().map(|q| q.to_string()).collect(),
            SAFETY_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            SAFETY_COUNTS.iter().map(|row| row.to_vec()).collect(),
        )?)
    }

    fn regional(&self, key: MetricKey) -> Result<Vec<RegionalIndicator>, DataError> {
        DataError::check_shape(key, MetricShape::Comparison)?;
        Ok(PROACTIVE_REGIONS
            .iter()
            .zip(PROACTIVE.iter())
            .map(|(&region, &(indicator, last, this))| {
                RegionalIndicator::new(region, indicator, last, this)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LabelRange;

    #[test]
    fn every_series_key_has_twelve_months() {
        let p = SampleProvider::new();
        for key in MetricKey::series_keys() {
            let s = p.full_series(key).unwrap();
            assert_eq!(s.len(), 12, "{key}");
            assert_eq!(s.first().unwrap().0, "Jan");
            assert_eq!(s.last().unwrap().0, "Dec");
            assert_eq!(s.name(), key.as_str());
        }
    }

    #[test]
    fn latest_readings() {
        let p = SampleProvider::new();
        let last = |k| p.full_series(k).unwrap().last().unwrap().1;
        assert_eq!(last(MetricKey::DerailmentRate), 0.28);
        assert_eq!(last(MetricKey::LocomotiveAvailability), 87.0);
        assert_eq!(last(MetricKey::OnTimePerformance), 92.5);
        assert_eq!(last(MetricKey::TerminalDwell), 23.5);
    }

    #[test]
    fn series_by_label_range() {
        let s = SampleProvider::new()
            .series(MetricKey::DerailmentRate, Some(&LabelRange::between("Jan", "Mar")))
            .unwrap();
        assert_eq!(s.values(), [0.45, 0.43, 0.41]);
    }

    #[test]
    fn comparison_matches_leading_indicators() {
        let c = SampleProvider::new()
            .comparison(MetricKey::ProactiveIndicators)
            .unwrap();
        assert_eq!(c.rows().len(), 3);
        assert_eq!(c.get("Signal Failures").unwrap().this, 45.0);
    }

    #[test]
    fn safety_table_shape() {
        let t = SampleProvider::new().table(MetricKey::SafetyIncidents).unwrap();
        assert_eq!(t.periods().len(), 4);
        assert_eq!(t.categories().len(), 4);
        assert_eq!(t.period_series("Quarter 1").unwrap().values(), [5.0, 2.0, 11.0, 8.0]);
    }

    #[test]
    fn regional_pairs_provinces_with_indicators() {
        let rows = SampleProvider::new()
            .regional(MetricKey::ProactiveIndicators)
            .unwrap();
        assert_eq!(rows[0].region, "Jawa Barat");
        assert_eq!(rows[0].indicator, "Track Defects Found");
        assert_eq!(rows[2].region, "Sumatera Utara");
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let p = SampleProvider::new();
        assert!(matches!(
            p.comparison(MetricKey::TerminalDwell),
            Err(DataError::WrongShape { .. })
        ));
        assert!(matches!(
            p.full_series(MetricKey::SafetyIncidents),
            Err(DataError::WrongShape { .. })
        ));
    }
}
