//! CSV-backed provider: one `<metric-key>.csv` file per metric in a directory.
//!
//! Files use the layouts from [`csv_codec`](super::csv_codec), so anything
//! exported from a page can be loaded back as a data source.

use std::fs::File;
use std::path::PathBuf;

use tracing::debug;

use super::csv_codec;
use super::provider::{DataError, SeriesProvider};
use crate::domain::{CategoryTable, IndicatorComparison, MetricKey, MetricSeries, MetricShape};

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: MetricKey) -> PathBuf {
        self.dir.join(format!("{}.csv", key.as_str()))
    }

    fn open(&self, key: MetricKey) -> Result<File, DataError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Err(DataError::UnknownMetric {
                key,
                provider: format!("csv directory {}", self.dir.display()),
            });
        }
        debug!(metric = %key, path = %path.display(), "reading metric CSV");
        File::open(&path).map_err(|source| DataError::Io { path, source })
    }
}

impl SeriesProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn full_series(&self, key: MetricKey) -> Result<MetricSeries, DataError> {
        DataError::check_shape(key, MetricShape::Series)?;
        csv_codec::read_series(key.as_str(), self.open(key)?)
    }

    fn comparison(&self, key: MetricKey) -> Result<IndicatorComparison, DataError> {
        DataError::check_shape(key, MetricShape::Comparison)?;
        csv_codec::read_comparison(key.as_str(), self.open(key)?)
    }

    fn table(&self, key: MetricKey) -> Result<CategoryTable, DataError> {
        DataError::check_shape(key, MetricShape::Table)?;
        csv_codec::read_table(key.as_str(), self.open(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SampleProvider;

    #[test]
    fn missing_file_is_unknown_metric() {
        let dir = tempfile::tempdir().unwrap();
        let p = CsvProvider::new(dir.path());
        assert!(matches!(
            p.full_series(MetricKey::TerminalDwell),
            Err(DataError::UnknownMetric { .. })
        ));
    }

    #[test]
    fn reads_what_the_codec_writes() {
        let dir = tempfile::tempdir().unwrap();
        let p = CsvProvider::new(dir.path());
        let sample = SampleProvider::new();

        let series = sample.full_series(MetricKey::TerminalDwell).unwrap();
        let file = File::create(p.path_for(MetricKey::TerminalDwell)).unwrap();
        csv_codec::write_series(&series, file).unwrap();

        let table = sample.table(MetricKey::SafetyIncidents).unwrap();
        let file = File::create(p.path_for(MetricKey::SafetyIncidents)).unwrap();
        csv_codec::write_table(&table, file).unwrap();

        let comparison = sample.comparison(MetricKey::ProactiveIndicators).unwrap();
        let file = File::create(p.path_for(MetricKey::ProactiveIndicators)).unwrap();
        csv_codec::write_comparison(&comparison, file).unwrap();

        assert_eq!(p.full_series(MetricKey::TerminalDwell).unwrap(), series);
        assert_eq!(p.table(MetricKey::SafetyIncidents).unwrap(), table);
        assert_eq!(p.comparison(MetricKey::ProactiveIndicators).unwrap(), comparison);
    }

    #[test]
    fn path_uses_metric_key() {
        let p = CsvProvider::new("/data/kpi");
        assert_eq!(
            p.path_for(MetricKey::OnTimePerformance),
            PathBuf::from("/data/kpi/on-time-performance.csv")
        );
    }
}
