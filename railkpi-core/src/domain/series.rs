//! MetricSeries: the ordered, labelled values behind every KPI chart.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::MetricsError;

/// What the labels of a series denote. Also names the label column on export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    Month,
    Quarter,
    Category,
}

impl PeriodKind {
    /// Lowercase column header used in series CSV (`month,value`).
    pub fn column_name(self) -> &'static str {
        match self {
            PeriodKind::Month => "month",
            PeriodKind::Quarter => "quarter",
            PeriodKind::Category => "category",
        }
    }

    /// Capitalized column header used in long-format table CSV (`Quarter,Category,Value`).
    pub fn title(self) -> &'static str {
        match self {
            PeriodKind::Month => "Month",
            PeriodKind::Quarter => "Quarter",
            PeriodKind::Category => "Category",
        }
    }

    /// Inverse of [`column_name`](Self::column_name) / [`title`](Self::title), case-insensitive.
    pub fn from_column_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "month" => Some(PeriodKind::Month),
            "quarter" => Some(PeriodKind::Quarter),
            "category" => Some(PeriodKind::Category),
            _ => None,
        }
    }
}

/// Inclusive index range `[start, end]` into a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    pub start: usize,
    pub end: usize,
}

impl PeriodRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of periods covered. A validated range always covers at least one.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    /// Check the range against a series length.
    pub fn validate(&self, len: usize) -> Result<(), MetricsError> {
        if self.start > self.end || self.end >= len {
            return Err(MetricsError::InvalidRange {
                start: self.start,
                end: self.end,
                len,
            });
        }
        Ok(())
    }
}

/// A sub-range expressed as period labels, as a user picks it.
///
/// Either bound may be omitted: a missing `from` means the first period,
/// a missing `to` the last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRange {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl LabelRange {
    pub fn new(from: Option<String>, to: Option<String>) -> Self {
        Self { from, to }
    }

    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Resolve labels to a validated index range over `series`.
    pub fn resolve(&self, series: &MetricSeries) -> Result<PeriodRange, MetricsError> {
        let full = series.full_range()?;
        let start = match &self.from {
            Some(label) => series.require_position(label)?,
            None => full.start,
        };
        let end = match &self.to {
            Some(label) => series.require_position(label)?,
            None => full.end,
        };
        let range = PeriodRange::new(start, end);
        range.validate(series.len())?;
        Ok(range)
    }
}

/// An ordered sequence of `(label, value)` pairs with unique labels.
///
/// Insertion order is chronological order. The series is immutable once built;
/// sub-ranges produce new series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SeriesRepr")]
pub struct MetricSeries {
    name: String,
    kind: PeriodKind,
    labels: Vec<String>,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct SeriesRepr {
    name: String,
    kind: PeriodKind,
    labels: Vec<String>,
    values: Vec<f64>,
}

impl TryFrom<SeriesRepr> for MetricSeries {
    type Error = MetricsError;

    fn try_from(repr: SeriesRepr) -> Result<Self, Self::Error> {
        Self::from_parts(repr.name, repr.kind, repr.labels, repr.values)
    }
}

impl MetricSeries {
    /// Build a series from `(label, value)` pairs, rejecting duplicate labels.
    pub fn new<L, I>(name: impl Into<String>, kind: PeriodKind, points: I) -> Result<Self, MetricsError>
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, f64)>,
    {
        let (labels, values): (Vec<String>, Vec<f64>) =
            points.into_iter().map(|(l, v)| (l.into(), v)).unzip();
        Self::from_parts(name.into(), kind, labels, values)
    }

    /// Build a series from parallel label and value vectors.
    pub fn from_parts(
        name: String,
        kind: PeriodKind,
        labels: Vec<String>,
        values: Vec<f64>,
    ) -> Result<Self, MetricsError> {
        if labels.len() != values.len() {
            return Err(MetricsError::LengthMismatch {
                series: name,
                labels: labels.len(),
                values: values.len(),
            });
        }
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(MetricsError::DuplicatePeriod {
                    series: name,
                    label: label.clone(),
                });
            }
        }
        Ok(Self {
            name,
            kind,
            labels,
            values,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PeriodKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(label, value)` pairs in order.
    pub fn points(&self) -> impl ExactSizeIterator<Item = (&str, f64)> + '_ {
        self.labels
            .iter()
            .zip(self.values.iter())
            .map(|(l, &v)| (l.as_str(), v))
    }

    pub fn get(&self, index: usize) -> Option<(&str, f64)> {
        Some((self.labels.get(index)?.as_str(), *self.values.get(index)?))
    }

    pub fn first(&self) -> Option<(&str, f64)> {
        self.get(0)
    }

    pub fn last(&self) -> Option<(&str, f64)> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Index of a period label, if present.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    fn require_position(&self, label: &str) -> Result<usize, MetricsError> {
        self.position(label).ok_or_else(|| MetricsError::UnknownPeriod {
            series: self.name.clone(),
            label: label.to_string(),
        })
    }

    /// The range covering every period. Fails on an empty series.
    pub fn full_range(&self) -> Result<PeriodRange, MetricsError> {
        match self.len() {
            0 => Err(MetricsError::EmptySeries {
                series: self.name.clone(),
            }),
            n => Ok(PeriodRange::new(0, n - 1)),
        }
    }

    /// Resolve an optional range: `None` means the full series.
    ///
    /// Empty series are rejected before any range check.
    pub fn resolve(&self, range: Option<PeriodRange>) -> Result<PeriodRange, MetricsError> {
        let full = self.full_range()?;
        match range {
            None => Ok(full),
            Some(r) => {
                r.validate(self.len())?;
                Ok(r)
            }
        }
    }

    /// Values inside an optional range.
    pub fn values_in(&self, range: Option<PeriodRange>) -> Result<&[f64], MetricsError> {
        let r = self.resolve(range)?;
        Ok(&self.values[r.start..=r.end])
    }

    /// A new series holding only the periods inside `range`.
    pub fn slice(&self, range: PeriodRange) -> Result<MetricSeries, MetricsError> {
        let r = self.resolve(Some(range))?;
        Ok(Self {
            name: self.name.clone(),
            kind: self.kind,
            labels: self.labels[r.start..=r.end].to_vec(),
            values: self.values[r.start..=r.end].to_vec(),
        })
    }
}
