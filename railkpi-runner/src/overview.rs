//! Overview dashboard: KPI cards, one-line insights, and the safety quarter view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use railkpi_core::{
    aggregate, delta, safe_pct_change, CategoryTable, IndicatorComparison, MetricKey, MetricSeries,
    MetricsError, SeriesProvider, Trend,
};

use crate::page::{PageError, SCHEMA_VERSION};

/// Quarter shown when none is asked for (the third quarter).
pub const DEFAULT_QUARTER_INDEX: usize = 2;

// ─── Building blocks ────────────────────────────────────────────────

/// Headline value of one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiCard {
    pub metric_key: MetricKey,
    pub title: String,
    pub unit: String,
    pub period: String,
    pub value: f64,
    pub delta: f64,
    pub delta_pct: f64,
}

impl KpiCard {
    pub fn from_series(key: MetricKey, series: &MetricSeries) -> Result<Self, MetricsError> {
        let d = delta(series, None)?;
        let period = series.last().map(|(l, _)| l.to_string()).unwrap_or_default();
        let info = key.info();
        Ok(Self {
            metric_key: key,
            title: info.title.to_string(),
            unit: info.unit.to_string(),
            period,
            value: d.current,
            delta: d.delta,
            delta_pct: d.delta_pct,
        })
    }

    /// Value with its unit, e.g. `92.5%` or `23.5 hours`.
    pub fn display_value(&self) -> String {
        if self.unit == "%" {
            format!("{:.1}%", self.value)
        } else {
            format!("{:.1} {}", self.value, self.unit)
        }
    }
}

/// Change from the first to the last period of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanChange {
    pub first_label: String,
    pub first: f64,
    pub last_label: String,
    pub last: f64,
    pub change: f64,
    pub pct_change: f64,
    pub trend: Trend,
}

impl SpanChange {
    pub fn of(series: &MetricSeries) -> Result<Self, MetricsError> {
        let empty = || MetricsError::EmptySeries {
            series: series.name().to_string(),
        };
        let (first_label, first) = series.first().ok_or_else(empty)?;
        let (last_label, last) = series.last().ok_or_else(empty)?;
        Ok(Self {
            first_label: first_label.to_string(),
            first,
            last_label: last_label.to_string(),
            last,
            change: last - first,
            pct_change: safe_pct_change(last, first),
            trend: Trend::between(first, last),
        })
    }
}

/// Totals and movers of the leading-indicator comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProactiveSummary {
    pub total_last: f64,
    pub total_this: f64,
    pub change: f64,
    pub pct_change: f64,
    pub average_ratio: Option<f64>,
    pub largest_mover: Option<String>,
    pub biggest_increase: Option<String>,
    pub biggest_decrease: Option<String>,
}

impl ProactiveSummary {
    pub fn of(comparison: &IndicatorComparison) -> Self {
        let name = |row: Option<&railkpi_core::ComparisonRow>| row.map(|r| r.category.clone());
        Self {
            total_last: comparison.total_last(),
            total_this: comparison.total_this(),
            change: comparison.total_change(),
            pct_change: comparison.total_pct_change(),
            average_ratio: comparison.average_ratio(),
            largest_mover: name(comparison.largest_absolute_change()),
            biggest_increase: name(comparison.biggest_increase()),
            biggest_decrease: name(comparison.biggest_decrease()),
        }
    }
}

/// One quarter of the lagging-indicator table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyQuarterView {
    pub quarter: String,
    /// Incident count per category, in table order.
    pub counts: MetricSeries,
    pub total: f64,
    pub top_category: String,
    pub top_value: f64,
    pub min: f64,
    pub max: f64,
}

/// Quarter label used when the caller does not pick one.
pub fn default_quarter(table: &CategoryTable) -> Option<&str> {
    let periods = table.periods();
    periods
        .get(DEFAULT_QUARTER_INDEX)
        .or_else(|| periods.last())
        .map(String::as_str)
}

/// Summary of one quarter; the default quarter when `quarter` is `None`.
pub fn safety_quarter(
    table: &CategoryTable,
    quarter: Option<&str>,
) -> Result<SafetyQuarterView, MetricsError> {
    let quarter = match quarter {
        Some(q) => q,
        None => default_quarter(table).ok_or_else(|| MetricsError::EmptySeries {
            series: table.name().to_string(),
        })?,
    };
    let counts = table.period_series(quarter)?;
    let agg = aggregate(&counts, None)?;
    let (top_category, top_value) = table.top_category(quarter)?;
    Ok(SafetyQuarterView {
        quarter: quarter.to_string(),
        total: agg.sum,
        top_category: top_category.to_string(),
        top_value,
        min: agg.min,
        max: agg.max,
        counts,
    })
}

// ─── Overview ───────────────────────────────────────────────────────

/// A one-line takeaway about one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub metric_key: MetricKey,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewReport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub provider: String,
    pub cards: Vec<KpiCard>,
    pub derailment: SpanChange,
    pub availability: KpiCard,
    pub dwell: SpanChange,
    pub on_time: SpanChange,
    pub proactive: ProactiveSummary,
    /// Incidents per quarter, all categories summed.
    pub safety_totals: MetricSeries,
    pub safety_trend: SpanChange,
    pub insights: Vec<Insight>,
}

/// Assemble the overview from every metric the provider serves.
pub fn build_overview(provider: &dyn SeriesProvider) -> Result<OverviewReport, PageError> {
    let derail_series = provider.full_series(MetricKey::DerailmentRate)?;
    let avail_series = provider.full_series(MetricKey::LocomotiveAvailability)?;
    let on_time_series = provider.full_series(MetricKey::OnTimePerformance)?;
    let dwell_series = provider.full_series(MetricKey::TerminalDwell)?;
    let proactive = provider.comparison(MetricKey::ProactiveIndicators)?;
    let safety = provider.table(MetricKey::SafetyIncidents)?;

    let cards = vec![
        KpiCard::from_series(MetricKey::LocomotiveAvailability, &avail_series)?,
        KpiCard::from_series(MetricKey::OnTimePerformance, &on_time_series)?,
        KpiCard::from_series(MetricKey::TerminalDwell, &dwell_series)?,
    ];
    let derailment = SpanChange::of(&derail_series)?;
    let availability = cards[0].clone();
    let dwell = SpanChange::of(&dwell_series)?;
    let on_time = SpanChange::of(&on_time_series)?;
    let proactive = ProactiveSummary::of(&proactive);
    let safety_totals = safety.totals()?;
    let safety_trend = SpanChange::of(&safety_totals)?;

    let insights = vec![
        derailment_insight(&derailment, derail_series.len()),
        availability_insight(&availability),
        dwell_insight(&dwell),
        on_time_insight(&on_time),
        proactive_insight(&proactive),
        safety_insight(&safety_trend),
    ];
    debug!(provider = provider.name(), insights = insights.len(), "built overview");

    Ok(OverviewReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        provider: provider.name().to_string(),
        cards,
        derailment,
        availability,
        dwell,
        on_time,
        proactive,
        safety_totals,
        safety_trend,
        insights,
    })
}

// ─── Insight text ───────────────────────────────────────────────────

fn derailment_insight(s: &SpanChange, periods: usize) -> Insight {
    Insight {
        metric_key: MetricKey::DerailmentRate,
        text: format!(
            "Derailment rate is {} over the {periods}-period window ({:+.1}% vs start).",
            s.trend, s.pct_change
        ),
    }
}

fn availability_insight(card: &KpiCard) -> Insight {
    Insight {
        metric_key: MetricKey::LocomotiveAvailability,
        text: format!(
            "Availability at {}% (Δ {:+} pp vs prior period).",
            card.value, card.delta
        ),
    }
}

fn dwell_insight(s: &SpanChange) -> Insight {
    let text = if s.change == 0.0 {
        format!("Terminal dwell is unchanged since {}.", s.first_label)
    } else {
        format!(
            "Terminal dwell has {} by {:.1} hrs since {}.",
            if s.trend.is_improvement(MetricKey::TerminalDwell.info().lower_is_better) {
                "improved"
            } else {
                "worsened"
            },
            s.change.abs(),
            s.first_label
        )
    };
    Insight {
        metric_key: MetricKey::TerminalDwell,
        text,
    }
}

fn on_time_insight(s: &SpanChange) -> Insight {
    Insight {
        metric_key: MetricKey::OnTimePerformance,
        text: format!(
            "On-time performance is {:.1}% (Δ {:+.1} pp vs {}).",
            s.last, s.change, s.first_label
        ),
    }
}

fn proactive_insight(p: &ProactiveSummary) -> Insight {
    let mut text = if p.change == 0.0 {
        "Proactive events are unchanged vs last period.".to_string()
    } else {
        format!(
            "Proactive events {} by {} events vs last period.",
            if p.change > 0.0 { "increased" } else { "decreased" },
            p.change.abs()
        )
    };
    if let Some(mover) = &p.largest_mover {
        text.push_str(&format!(" {mover} shows the largest absolute change."));
    }
    Insight {
        metric_key: MetricKey::ProactiveIndicators,
        text,
    }
}

fn safety_insight(s: &SpanChange) -> Insight {
    Insight {
        metric_key: MetricKey::SafetyIncidents,
        text: format!(
            "Quarterly incidents are trending {} from {} to {} ({}={}, {}={}).",
            s.trend.direction_word(),
            s.first_label,
            s.last_label,
            s.first_label,
            s.first,
            s.last_label,
            s.last
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use railkpi_core::SampleProvider;

    fn overview() -> OverviewReport {
        build_overview(&SampleProvider::new()).unwrap()
    }

    fn insight(r: &OverviewReport, key: MetricKey) -> &str {
        &r.insights.iter().find(|i| i.metric_key == key).unwrap().text
    }

    #[test]
    fn cards_show_latest_values() {
        let r = overview();
        let shown: Vec<String> = r.cards.iter().map(KpiCard::display_value).collect();
        assert_eq!(shown, ["87.0%", "92.5%", "23.5 hours"]);
        assert_eq!(r.availability.delta, -1.0);
    }

    #[test]
    fn derailment_change_vs_start() {
        let r = overview();
        assert_eq!(r.derailment.trend, Trend::Decreasing);
        assert!((r.derailment.pct_change - -37.777_777_777_777_78).abs() < 1e-9);
        assert_eq!(
            insight(&r, MetricKey::DerailmentRate),
            "Derailment rate is decreasing over the 12-period window (-37.8% vs start)."
        );
    }

    #[test]
    fn availability_and_on_time_insights() {
        let r = overview();
        assert_eq!(
            insight(&r, MetricKey::LocomotiveAvailability),
            "Availability at 87% (Δ -1 pp vs prior period)."
        );
        assert_eq!(
            insight(&r, MetricKey::OnTimePerformance),
            "On-time performance is 92.5% (Δ +2.4 pp vs Jan)."
        );
    }

    #[test]
    fn dwell_improved_since_first_month() {
        let r = overview();
        assert_eq!(
            insight(&r, MetricKey::TerminalDwell),
            "Terminal dwell has improved by 4.0 hrs since Jan."
        );
    }

    #[test]
    fn proactive_totals() {
        let r = overview();
        assert_eq!(r.proactive.total_last, 260.0);
        assert_eq!(r.proactive.total_this, 275.0);
        assert_eq!(r.proactive.change, 15.0);
        assert_eq!(r.proactive.largest_mover.as_deref(), Some("Track Defects Found"));
        assert_eq!(r.proactive.biggest_decrease.as_deref(), Some("Signal Failures"));
        assert_eq!(
            insight(&r, MetricKey::ProactiveIndicators),
            "Proactive events increased by 15 events vs last period. \
             Track Defects Found shows the largest absolute change."
        );
    }

    #[test]
    fn quarterly_safety_trend() {
        let r = overview();
        assert_eq!(r.safety_totals.values(), [26.0, 18.0, 23.0, 12.0]);
        assert_eq!(r.safety_trend.trend, Trend::Decreasing);
        assert_eq!(
            insight(&r, MetricKey::SafetyIncidents),
            "Quarterly incidents are trending down from Quarter 1 to Quarter 4 \
             (Quarter 1=26, Quarter 4=12)."
        );
    }

    #[test]
    fn safety_quarter_defaults_to_third() {
        let table = SampleProvider::new().table(MetricKey::SafetyIncidents).unwrap();
        let v = safety_quarter(&table, None).unwrap();
        assert_eq!(v.quarter, "Quarter 3");
        assert_eq!(v.total, 23.0);
        assert_eq!(v.top_category, "Highway-Rail Crossing Incidents");
        assert_eq!(v.top_value, 9.0);
        assert_eq!((v.min, v.max), (3.0, 9.0));
        assert_eq!(v.counts.len(), 4);
    }

    #[test]
    fn safety_quarter_by_label() {
        let table = SampleProvider::new().table(MetricKey::SafetyIncidents).unwrap();
        let v = safety_quarter(&table, Some("Quarter 1")).unwrap();
        assert_eq!(v.total, 26.0);
        assert!(matches!(
            safety_quarter(&table, Some("Quarter 9")),
            Err(MetricsError::UnknownPeriod { .. })
        ));
    }

    #[test]
    fn span_change_of_flat_series() {
        let s = MetricSeries::new(
            "flat",
            railkpi_core::PeriodKind::Month,
            [("Jan", 0.0), ("Feb", 0.0)],
        )
        .unwrap();
        let span = SpanChange::of(&s).unwrap();
        assert_eq!(span.trend, Trend::Flat);
        assert_eq!(span.pct_change, 0.0);
    }

    #[test]
    fn rising_dwell_is_worsened() {
        let s = MetricSeries::new(
            "dwell",
            railkpi_core::PeriodKind::Month,
            [("Jan", 23.5), ("Feb", 25.0)],
        )
        .unwrap();
        let text = dwell_insight(&SpanChange::of(&s).unwrap()).text;
        assert_eq!(text, "Terminal dwell has worsened by 1.5 hrs since Jan.");
    }
}
