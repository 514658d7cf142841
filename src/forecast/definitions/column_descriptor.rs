// src/forecast/definitions/column_descriptor.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::forecast_row::ForecastRow;

/// Descriptive columns that always lead, in this order.
const PINNED_COLUMNS: [&str; 5] = [
    "Material",
    "Material Description",
    "Description",
    "Product",
    "Branch",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub key: String,
    pub label: String,
}

impl ColumnDescriptor {
    pub fn from_key(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: key.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ColumnGroup {
    Pinned(usize),
    Descriptive,
    Sales,
    Forecast,
}

fn column_group(key: &str) -> ColumnGroup {
    let trimmed = key.trim();
    if let Some(pos) = PINNED_COLUMNS.iter().position(|p| *p == trimmed) {
        return ColumnGroup::Pinned(pos);
    }
    if trimmed.contains("RFC") {
        ColumnGroup::Forecast
    } else if trimmed.contains("Sales") {
        ColumnGroup::Sales
    } else {
        ColumnGroup::Descriptive
    }
}

/// First `Mon-YY` (or `Mon-YYYY`) token in a label, as the first of that month.
pub fn parse_period(label: &str) -> Option<NaiveDate> {
    label.split_whitespace().find_map(|token| {
        let candidate = format!("01-{}", token);
        NaiveDate::parse_from_str(&candidate, "%d-%b-%y")
            .or_else(|_| NaiveDate::parse_from_str(&candidate, "%d-%b-%Y"))
            .ok()
    })
}

/// Column set for a fetch, taken from the first row's keys and re-sorted:
/// pinned descriptive columns, other descriptive columns, `Sales`, then `RFC`.
/// Within Sales and RFC, dated labels go first in calendar order; the sort is
/// stable so ties keep backend order.
pub fn derive_columns(rows: &[ForecastRow]) -> Vec<ColumnDescriptor> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let mut columns: Vec<ColumnDescriptor> =
        first.keys().map(|k| ColumnDescriptor::from_key(k)).collect();
    columns.sort_by_key(|c| {
        let group = column_group(&c.key);
        let period = match group {
            ColumnGroup::Sales | ColumnGroup::Forecast => parse_period(&c.key),
            _ => None,
        };
        (group, period.is_none(), period)
    });
    columns
}
