//! CSV encoding for series, comparisons and category tables.
//!
//! Layouts (UTF-8, comma-delimited, header row first):
//! - series: `<label column>,value` where the label column is `month`,
//!   `quarter` or `category`
//! - comparison: `category,last,this,change,pct_change,ratio`, with an empty
//!   ratio cell when the ratio is undefined
//! - table: `<Period>,Category,Value`, one row per period × category
//!
//! Values are written in shortest round-trip form so a decode of an encode
//! reproduces every value exactly.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use super::provider::DataError;
use crate::domain::{CategoryTable, ComparisonRow, IndicatorComparison, MetricSeries, PeriodKind};

// ─── Series ─────────────────────────────────────────────────────────

pub fn write_series<W: Write>(series: &MetricSeries, writer: W) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([series.kind().column_name(), "value"])?;
    for (label, value) in series.points() {
        wtr.write_record([label, &value.to_string()])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Decode a series; the label column header determines the period kind.
pub fn read_series<R: Read>(name: &str, reader: R) -> Result<MetricSeries, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.len() != 2 || !headers[1].trim().eq_ignore_ascii_case("value") {
        return Err(DataError::Malformed(format!(
            "series '{name}': expected header '<period>,value', got '{}'",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }
    let kind = PeriodKind::from_column_name(&headers[0]).ok_or_else(|| {
        DataError::Malformed(format!(
            "series '{name}': unknown period column '{}'",
            &headers[0]
        ))
    })?;

    let mut labels = Vec::new();
    let mut values = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let value = parse_value(name, line, &record[1])?;
        labels.push(record[0].to_string());
        values.push(value);
    }
    Ok(MetricSeries::from_parts(name.to_string(), kind, labels, values)?)
}

// ─── Comparison ─────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct ComparisonRecord {
    category: String,
    last: f64,
    this: f64,
    #[serde(default)]
    change: Option<f64>,
    #[serde(default)]
    pct_change: Option<f64>,
    #[serde(default)]
    ratio: Option<f64>,
}

pub fn write_comparison<W: Write>(comparison: &IndicatorComparison, writer: W) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in comparison.rows() {
        wtr.serialize(ComparisonRecord {
            category: row.category.clone(),
            last: row.last,
            this: row.this,
            change: Some(row.change()),
            pct_change: Some(row.pct_change()),
            ratio: row.ratio(),
        })?;
    }
    if comparison.is_empty() {
        wtr.write_record(["category", "last", "this", "change", "pct_change", "ratio"])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Decode a comparison. Derived columns are ignored and recomputed.
pub fn read_comparison<R: Read>(name: &str, reader: R) -> Result<IndicatorComparison, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        let r: ComparisonRecord = record?;
        rows.push(ComparisonRow::new(r.category, r.last, r.this));
    }
    Ok(IndicatorComparison::new(name, rows)?)
}

// ─── Category table ─────────────────────────────────────────────────

pub fn write_table<W: Write>(table: &CategoryTable, writer: W) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([table.period_kind().title(), "Category", "Value"])?;
    for (period, category, value) in table.cells() {
        wtr.write_record([period, category, &value.to_string()])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Decode a long-format table. Periods and categories keep first-appearance order;
/// every period must list every category exactly once.
pub fn read_table<R: Read>(name: &str, reader: R) -> Result<CategoryTable, DataError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.len() != 3 {
        return Err(DataError::Malformed(format!(
            "table '{name}': expected 3 columns, got {}",
            headers.len()
        )));
    }
    let kind = PeriodKind::from_column_name(&headers[0]).ok_or_else(|| {
        DataError::Malformed(format!("table '{name}': unknown period column '{}'", &headers[0]))
    })?;

    let mut periods: Vec<String> = Vec::new();
    let mut categories: Vec<String> = Vec::new();
    let mut cells: Vec<(usize, usize, f64)> = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let p = index_of_or_push(&mut periods, &record[0]);
        let c = index_of_or_push(&mut categories, &record[1]);
        cells.push((p, c, parse_value(name, line, &record[2])?));
    }

    let mut values = vec![vec![None; categories.len()]; periods.len()];
    for (p, c, v) in cells {
        if values[p][c].replace(v).is_some() {
            return Err(DataError::Malformed(format!(
                "table '{name}': duplicate cell ({}, {})",
                periods[p], categories[c]
            )));
        }
    }
    let values = values
        .into_iter()
        .enumerate()
        .map(|(p, row)| {
            row.into_iter()
                .enumerate()
                .map(|(c, v)| {
                    v.ok_or_else(|| {
                        DataError::Malformed(format!(
                            "table '{name}': missing cell ({}, {})",
                            periods[p], categories[c]
                        ))
                    })
                })
                .collect::<Result<Vec<f64>, DataError>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CategoryTable::new(name, kind, periods, categories, values)?)
}

fn index_of_or_push(items: &mut Vec<String>, item: &str) -> usize {
    match items.iter().position(|x| x == item) {
        Some(i) => i,
        None => {
            items.push(item.to_string());
            items.len() - 1
        }
    }
}

fn parse_value(name: &str, line: usize, raw: &str) -> Result<f64, DataError> {
    raw.trim().parse::<f64>().map_err(|e| {
        DataError::Malformed(format!("'{name}' row {}: bad value '{raw}': {e}", line + 1))
    })
}
