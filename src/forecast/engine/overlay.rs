// src/forecast/engine/overlay.rs
use std::collections::{BTreeMap, HashMap};

use crate::forecast::definitions::{ForecastRow, RowKey};

/// Unsaved cell edits layered over the fetched rows.
///
/// Values stay raw strings so an intentionally blank cell is different from
/// zero. Single-column edits never drop other entries; only [`reset`] clears
/// the store, which the grid does when it applies a fetch.
///
/// [`reset`]: EditOverlay::reset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditOverlay {
    edits: HashMap<RowKey, BTreeMap<String, String>>,
    revision: u64,
}

impl EditOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay entry if present, else the fetched value as text.
    pub fn effective_value(&self, row: &ForecastRow, column: &str) -> String {
        self.entry(&row.key(), column)
            .map(str::to_string)
            .unwrap_or_else(|| row.text(column))
    }

    pub fn set_value(&mut self, row: &ForecastRow, column: &str, value: impl Into<String>) {
        self.set_by_key(row.key(), column, value);
    }

    pub fn set_by_key(&mut self, key: RowKey, column: &str, value: impl Into<String>) {
        self.edits
            .entry(key)
            .or_default()
            .insert(column.to_string(), value.into());
        self.revision += 1;
    }

    pub fn entry(&self, key: &str, column: &str) -> Option<&str> {
        self.edits
            .get(key)
            .and_then(|cols| cols.get(column))
            .map(String::as_str)
    }

    pub fn entries_for(&self, key: &str) -> Option<&BTreeMap<String, String>> {
        self.edits.get(key)
    }

    pub fn has_entries(&self, key: &str) -> bool {
        self.edits.get(key).is_some_and(|cols| !cols.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.edits.values().all(BTreeMap::is_empty)
    }

    /// Number of rows with at least one edit.
    pub fn edited_row_count(&self) -> usize {
        self.edits.values().filter(|cols| !cols.is_empty()).count()
    }

    /// Bumped on every mutation; lets callers tell whether edits happened
    /// while a request built from an earlier state was in flight.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn reset(&mut self) {
        self.edits.clear();
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> ForecastRow {
        ForecastRow::from_value(json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": "10"}))
            .unwrap()
    }

    #[test]
    fn overlay_wins_over_fetched_value_until_reset() {
        let r = row();
        let mut overlay = EditOverlay::new();
        assert_eq!(overlay.effective_value(&r, "Jan-25 RFC"), "10");
        overlay.set_value(&r, "Jan-25 RFC", "15");
        assert_eq!(overlay.effective_value(&r, "Jan-25 RFC"), "15");
        overlay.reset();
        assert_eq!(overlay.effective_value(&r, "Jan-25 RFC"), "10");
    }

    #[test]
    fn blank_edit_is_kept_distinct_from_missing() {
        let r = row();
        let mut overlay = EditOverlay::new();
        overlay.set_value(&r, "Jan-25 RFC", "");
        assert_eq!(overlay.effective_value(&r, "Jan-25 RFC"), "");
        assert!(overlay.has_entries("M1_B1"));
    }

    #[test]
    fn single_column_edit_keeps_other_columns() {
        let r = row();
        let mut overlay = EditOverlay::new();
        overlay.set_value(&r, "Jan-25 RFC", "1");
        overlay.set_value(&r, "Feb-25 RFC", "2");
        overlay.set_value(&r, "Jan-25 RFC", "3");
        let entries = overlay.entries_for("M1_B1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["Jan-25 RFC"], "3");
        assert_eq!(entries["Feb-25 RFC"], "2");
    }

    #[test]
    fn missing_fields_resolve_to_empty() {
        let r = row();
        assert_eq!(EditOverlay::new().effective_value(&r, "Feb-25 RFC"), "");
    }

    #[test]
    fn revision_tracks_mutations() {
        let r = row();
        let mut overlay = EditOverlay::new();
        let start = overlay.revision();
        overlay.set_value(&r, "Jan-25 RFC", "1");
        assert_eq!(overlay.revision(), start + 1);
        overlay.reset();
        assert_eq!(overlay.revision(), start + 2);
        assert!(overlay.is_empty());
    }
}
