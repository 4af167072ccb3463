//! This-period vs last-period comparisons for categorical indicators.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::calc::{ratio, safe_pct_change};
use crate::error::MetricsError;

/// Upper bound for [`ComparisonRow::scaled_ratio`].
pub const SCALED_RATIO_MAX: f64 = 10.0;

/// One category with its last-period and this-period counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub category: String,
    pub last: f64,
    pub this: f64,
}

impl ComparisonRow {
    pub fn new(category: impl Into<String>, last: f64, this: f64) -> Self {
        Self {
            category: category.into(),
            last,
            this,
        }
    }

    pub fn change(&self) -> f64 {
        self.this - self.last
    }

    /// Percent change vs last period; 0 when last is 0.
    pub fn pct_change(&self) -> f64 {
        safe_pct_change(self.this, self.last)
    }

    /// `this / last`, or `None` when last is 0.
    pub fn ratio(&self) -> Option<f64> {
        ratio(self.this, self.last)
    }

    /// Half the ratio, clamped to `[0, 10]`, for bar lengths.
    pub fn scaled_ratio(&self) -> Option<f64> {
        self.ratio().map(|r| (r / 2.0).clamp(0.0, SCALED_RATIO_MAX))
    }
}

/// A set of categories compared period over period. Category names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ComparisonRepr")]
pub struct IndicatorComparison {
    name: String,
    rows: Vec<ComparisonRow>,
}

#[derive(Deserialize)]
struct ComparisonRepr {
    name: String,
    rows: Vec<ComparisonRow>,
}

impl TryFrom<ComparisonRepr> for IndicatorComparison {
    type Error = MetricsError;

    fn try_from(repr: ComparisonRepr) -> Result<Self, Self::Error> {
        Self::new(repr.name, repr.rows)
    }
}

impl IndicatorComparison {
    pub fn new(name: impl Into<String>, rows: Vec<ComparisonRow>) -> Result<Self, MetricsError> {
        let name = name.into();
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.category.as_str()) {
                return Err(MetricsError::DuplicatePeriod {
                    series: name,
                    label: row.category.clone(),
                });
            }
        }
        Ok(Self { name, rows })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.category.as_str())
    }

    pub fn get(&self, category: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.category == category)
    }

    /// Keep only the selected categories, in their original order.
    ///
    /// Unknown names in `selected` are ignored.
    pub fn filter<S: AsRef<str>>(&self, selected: &[S]) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|r| selected.iter().any(|s| s.as_ref() == r.category))
            .cloned()
            .collect();
        Self {
            name: self.name.clone(),
            rows,
        }
    }

    pub fn total_last(&self) -> f64 {
        self.rows.iter().map(|r| r.last).sum()
    }

    pub fn total_this(&self) -> f64 {
        self.rows.iter().map(|r| r.this).sum()
    }

    pub fn total_change(&self) -> f64 {
        self.total_this() - self.total_last()
    }

    pub fn total_pct_change(&self) -> f64 {
        safe_pct_change(self.total_this(), self.total_last())
    }

    /// Mean of the defined ratios. `None` when no row has a defined ratio.
    pub fn average_ratio(&self) -> Option<f64> {
        let defined: Vec<f64> = self.rows.iter().filter_map(|r| r.ratio()).collect();
        if defined.is_empty() {
            return None;
        }
        Some(defined.iter().sum::<f64>() / defined.len() as f64)
    }

    /// Row with the largest change; the first one wins ties.
    pub fn biggest_increase(&self) -> Option<&ComparisonRow> {
        self.rows.iter().fold(None, |best: Option<&ComparisonRow>, row| match best {
            Some(b) if b.change() >= row.change() => Some(b),
            _ => Some(row),
        })
    }

    /// Row with the smallest change; the first one wins ties.
    pub fn biggest_decrease(&self) -> Option<&ComparisonRow> {
        self.rows.iter().fold(None, |best: Option<&ComparisonRow>, row| match best {
            Some(b) if b.change() <= row.change() => Some(b),
            _ => Some(row),
        })
    }

    /// Row with the largest absolute change; the first one wins ties.
    pub fn largest_absolute_change(&self) -> Option<&ComparisonRow> {
        self.rows.iter().fold(None, |best: Option<&ComparisonRow>, row| match best {
            Some(b) if b.change().abs() >= row.change().abs() => Some(b),
            _ => Some(row),
        })
    }
}

/// One region's reading for an indicator, as placed on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalIndicator {
    pub region: String,
    pub indicator: String,
    pub last: f64,
    pub this: f64,
}

impl RegionalIndicator {
    pub fn new(region: impl Into<String>, indicator: impl Into<String>, last: f64, this: f64) -> Self {
        Self {
            region: region.into(),
            indicator: indicator.into(),
            last,
            this,
        }
    }

    /// The comparison row for this reading, keyed by indicator.
    pub fn row(&self) -> ComparisonRow {
        ComparisonRow::new(self.indicator.clone(), self.last, self.this)
    }
}
