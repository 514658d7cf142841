// src/forecast/definitions/column_filters.rs
use std::collections::{BTreeMap, BTreeSet};

use super::forecast_row::ForecastRow;

/// Allow-list filters keyed by column. Display only: the overlay and the
/// modification tracker always see the full row set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilters {
    allowed: BTreeMap<String, BTreeSet<String>>,
}

impl ColumnFilters {
    /// An empty allow-list removes the filter for that column.
    pub fn set(&mut self, column: &str, values: impl IntoIterator<Item = String>) {
        let values: BTreeSet<String> = values.into_iter().collect();
        if values.is_empty() {
            self.allowed.remove(column);
        } else {
            self.allowed.insert(column.to_string(), values);
        }
    }

    pub fn clear(&mut self, column: &str) {
        self.allowed.remove(column);
    }

    pub fn clear_all(&mut self) {
        self.allowed.clear();
    }

    pub fn allowed(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.allowed.get(column)
    }

    pub fn is_active(&self, column: &str) -> bool {
        self.allowed.contains_key(column)
    }

    pub fn active_count(&self) -> usize {
        self.allowed.len()
    }

    pub fn matches(&self, row: &ForecastRow) -> bool {
        self.allowed
            .iter()
            .all(|(column, values)| values.contains(&row.text(column)))
    }

    /// Indices into `rows` of the rows passing every filter.
    pub fn apply(&self, rows: &[ForecastRow]) -> Vec<usize> {
        if self.allowed.is_empty() {
            return (0..rows.len()).collect();
        }
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.matches(row))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Sorted distinct raw values of a column, used to build filter choices.
pub fn distinct_values(rows: &[ForecastRow], column: &str) -> Vec<String> {
    rows.iter()
        .map(|r| r.text(column))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
