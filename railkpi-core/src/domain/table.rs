//! CategoryTable: a period × category matrix such as quarterly incident counts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::series::{MetricSeries, PeriodKind};
use crate::error::MetricsError;

/// Values laid out by period (rows) and category (columns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr")]
pub struct CategoryTable {
    name: String,
    period_kind: PeriodKind,
    periods: Vec<String>,
    categories: Vec<String>,
    /// `values[p][c]` is the value of category `c` in period `p`.
    values: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct TableRepr {
    name: String,
    period_kind: PeriodKind,
    periods: Vec<String>,
    categories: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl TryFrom<TableRepr> for CategoryTable {
    type Error = MetricsError;

    fn try_from(repr: TableRepr) -> Result<Self, Self::Error> {
        Self::new(repr.name, repr.period_kind, repr.periods, repr.categories, repr.values)
    }
}

impl CategoryTable {
    pub fn new(
        name: impl Into<String>,
        period_kind: PeriodKind,
        periods: Vec<String>,
        categories: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, MetricsError> {
        let name = name.into();
        if periods.len() != values.len() {
            return Err(MetricsError::LengthMismatch {
                series: name,
                labels: periods.len(),
                values: values.len(),
            });
        }
        for (period, row) in periods.iter().zip(&values) {
            if row.len() != categories.len() {
                return Err(MetricsError::LengthMismatch {
                    series: format!("{name}/{period}"),
                    labels: categories.len(),
                    values: row.len(),
                });
            }
        }
        check_unique(&name, &periods)?;
        check_unique(&name, &categories)?;
        Ok(Self {
            name,
            period_kind,
            periods,
            categories,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period_kind(&self) -> PeriodKind {
        self.period_kind
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn value(&self, period: usize, category: usize) -> Option<f64> {
        self.values.get(period)?.get(category).copied()
    }

    /// Iterate `(period, category, value)` in period-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str, f64)> + '_ {
        self.periods.iter().zip(&self.values).flat_map(move |(p, row)| {
            self.categories
                .iter()
                .zip(row)
                .map(move |(c, &v)| (p.as_str(), c.as_str(), v))
        })
    }

    fn period_index(&self, period: &str) -> Result<usize, MetricsError> {
        self.periods
            .iter()
            .position(|p| p == period)
            .ok_or_else(|| MetricsError::UnknownPeriod {
                series: self.name.clone(),
                label: period.to_string(),
            })
    }

    /// One period across all categories (labels are category names).
    pub fn period_series(&self, period: &str) -> Result<MetricSeries, MetricsError> {
        let p = self.period_index(period)?;
        MetricSeries::from_parts(
            period.to_string(),
            PeriodKind::Category,
            self.categories.clone(),
            self.values[p].clone(),
        )
    }

    /// One category across all periods.
    pub fn category_series(&self, category: &str) -> Result<MetricSeries, MetricsError> {
        let c = self
            .categories
            .iter()
            .position(|x| x == category)
            .ok_or_else(|| MetricsError::UnknownPeriod {
                series: self.name.clone(),
                label: category.to_string(),
            })?;
        MetricSeries::from_parts(
            category.to_string(),
            self.period_kind,
            self.periods.clone(),
            self.values.iter().map(|row| row[c]).collect(),
        )
    }

    /// Sum over categories for each period.
    pub fn totals(&self) -> Result<MetricSeries, MetricsError> {
        MetricSeries::from_parts(
            format!("{} totals", self.name),
            self.period_kind,
            self.periods.clone(),
            self.values.iter().map(|row| row.iter().sum()).collect(),
        )
    }

    /// Category with the highest value in `period`; the first one wins ties.
    pub fn top_category(&self, period: &str) -> Result<(&str, f64), MetricsError> {
        let p = self.period_index(period)?;
        self.categories
            .iter()
            .zip(&self.values[p])
            .fold(None, |best: Option<(&str, f64)>, (c, &v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((c.as_str(), v)),
            })
            .ok_or_else(|| MetricsError::EmptySeries {
                series: format!("{}/{period}", self.name),
            })
    }
}

fn check_unique(name: &str, labels: &[String]) -> Result<(), MetricsError> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(MetricsError::DuplicatePeriod {
                series: name.to_string(),
                label: label.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn safety() -> CategoryTable {
        CategoryTable::new(
            "safety",
            PeriodKind::Quarter,
            vec!["Quarter 1".into(), "Quarter 2".into()],
            vec!["Derailments".into(), "Collisions".into(), "Crossings".into()],
            vec![vec![5.0, 2.0, 11.0], vec![3.0, 1.0, 8.0]],
        )
        .unwrap()
    }

    #[test]
    fn shape_is_validated() {
        let err = CategoryTable::new(
            "bad",
            PeriodKind::Quarter,
            vec!["Q1".into()],
            vec!["a".into(), "b".into()],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::LengthMismatch { labels: 2, values: 1, .. }));
    }

    #[test]
    fn period_and_category_views() {
        let t = safety();
        let q1 = t.period_series("Quarter 1").unwrap();
        assert_eq!(q1.kind(), PeriodKind::Category);
        assert_eq!(q1.values(), [5.0, 2.0, 11.0]);

        let collisions = t.category_series("Collisions").unwrap();
        assert_eq!(collisions.kind(), PeriodKind::Quarter);
        assert_eq!(collisions.values(), [2.0, 1.0]);

        assert!(t.period_series("Quarter 9").is_err());
    }

    #[test]
    fn totals_and_top_category() {
        let t = safety();
        assert_eq!(t.totals().unwrap().values(), [18.0, 12.0]);
        assert_eq!(t.top_category("Quarter 2").unwrap(), ("Crossings", 8.0));
    }

    #[test]
    fn deserialization_revalidates() {
        let json = serde_json::to_string(&safety()).unwrap();
        assert_eq!(serde_json::from_str::<CategoryTable>(&json).unwrap(), safety());

        let ragged = r#"{"name":"t","period_kind":"quarter","periods":["Q1","Q2"],
            "categories":["A","B"],"values":[[1.0,2.0],[3.0]]}"#;
        let err = serde_json::from_str::<CategoryTable>(ragged).unwrap_err();
        assert!(err.to_string().contains("'t/Q2' has 2 labels but 1 values"), "{err}");

        let dup = r#"{"name":"t","period_kind":"quarter","periods":["Q1"],
            "categories":["A","A"],"values":[[1.0,2.0]]}"#;
        assert!(serde_json::from_str::<CategoryTable>(dup).is_err());
    }

    #[test]
    fn cells_are_period_major() {
        let t = safety();
        let cells: Vec<_> = t.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], ("Quarter 1", "Derailments", 5.0));
        assert_eq!(cells[3], ("Quarter 2", "Derailments", 3.0));
    }
}
