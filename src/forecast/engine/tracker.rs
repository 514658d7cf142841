// src/forecast/engine/tracker.rs
//! Derives modification state and Save/Post eligibility from the current
//! rows and overlay. Everything here is a pure function of its inputs.

use std::collections::BTreeSet;
use std::fmt;

use super::overlay::EditOverlay;
use crate::forecast::definitions::{
    CellValue, ForecastRow, PermissionConfig, Policy, PostRule, RowKey,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowStatus {
    /// At least one forecast column is filled.
    pub touched: bool,
    /// Every forecast column is filled.
    pub fully_filled: bool,
    /// At least one non-blank overlay entry.
    pub edited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostEligibility {
    Eligible,
    NoRows,
    NoForecastColumns,
    RowsIncomplete { incomplete: usize },
    NotPermitted,
}

impl PostEligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, PostEligibility::Eligible)
    }
}

impl fmt::Display for PostEligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostEligibility::Eligible => write!(f, "ready to post"),
            PostEligibility::NoRows => write!(f, "there are no rows for this period"),
            PostEligibility::NoForecastColumns => write!(f, "there are no forecast columns"),
            PostEligibility::RowsIncomplete { incomplete } => {
                write!(f, "{} row(s) still need forecast values", incomplete)
            }
            PostEligibility::NotPermitted => write!(f, "posting is locked for this period"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModificationSummary {
    pub modified: BTreeSet<RowKey>,
    pub fully_filled: BTreeSet<RowKey>,
    pub edited_rows: usize,
    pub row_count: usize,
    pub save_eligible: bool,
    pub post: PostEligibility,
}

/// Inputs of one tracker pass.
#[derive(Clone, Copy)]
pub struct TrackerInput<'a> {
    pub rows: &'a [ForecastRow],
    pub forecast_columns: &'a [String],
    pub overlay: &'a EditOverlay,
    pub permission: PermissionConfig,
    pub policy: Policy,
}

pub fn row_status(row: &ForecastRow, forecast_columns: &[String], overlay: &EditOverlay) -> RowStatus {
    let key = row.key();
    let mut touched = false;
    let mut fully_filled = true;
    for column in forecast_columns {
        let filled = CellValue::classify(&overlay.effective_value(row, column)).is_filled();
        touched |= filled;
        fully_filled &= filled;
    }
    let edited = overlay.entries_for(&key).is_some_and(|cols| {
        cols.values()
            .any(|v| !matches!(CellValue::classify(v), CellValue::Blank))
    });
    RowStatus {
        touched,
        fully_filled,
        edited,
    }
}

pub fn summarize(input: TrackerInput<'_>) -> ModificationSummary {
    let mut modified = BTreeSet::new();
    let mut fully_filled = BTreeSet::new();
    let mut incomplete = 0usize;

    for row in input.rows {
        let status = row_status(row, input.forecast_columns, input.overlay);
        let key = row.key();
        if status.touched {
            modified.insert(key.clone());
        }
        if status.fully_filled {
            fully_filled.insert(key);
        }
        let satisfies_rule = match input.policy.post_rule {
            PostRule::AllColumnsFilled => status.fully_filled,
            PostRule::EveryRowEdited => status.edited,
        };
        if !satisfies_rule {
            incomplete += 1;
        }
    }

    let save_eligible = !modified.is_empty()
        && (!input.policy.save_gated_by_permission || input.permission.save_allowed);

    let post = if input.rows.is_empty() {
        PostEligibility::NoRows
    } else if input.forecast_columns.is_empty() {
        PostEligibility::NoForecastColumns
    } else if incomplete > 0 {
        PostEligibility::RowsIncomplete { incomplete }
    } else if !input.permission.post_allowed {
        PostEligibility::NotPermitted
    } else {
        PostEligibility::Eligible
    };

    ModificationSummary {
        modified,
        fully_filled,
        edited_rows: input.overlay.edited_row_count(),
        row_count: input.rows.len(),
        save_eligible,
        post,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::definitions::OrgUnit;
    use serde_json::{json, Value};

    fn row(value: Value) -> ForecastRow {
        ForecastRow::from_value(value).unwrap()
    }

    fn cols(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    const ALLOW_ALL: PermissionConfig = PermissionConfig {
        post_allowed: true,
        save_allowed: true,
    };

    fn input<'a>(
        rows: &'a [ForecastRow],
        columns: &'a [String],
        overlay: &'a EditOverlay,
        permission: PermissionConfig,
        unit: OrgUnit,
    ) -> TrackerInput<'a> {
        TrackerInput {
            rows,
            forecast_columns: columns,
            overlay,
            permission,
            policy: unit.default_policy(),
        }
    }

    #[test]
    fn zero_is_not_filled_but_fraction_is() {
        let columns = cols(&["Jan-25 RFC"]);
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": ""}))];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Jan-25 RFC", "0");
        let s = summarize(input(&rows, &columns, &overlay, ALLOW_ALL, OrgUnit::Branch));
        assert_eq!(s.post, PostEligibility::RowsIncomplete { incomplete: 1 });
        assert!(s.modified.is_empty());

        overlay.set_value(&rows[0], "Jan-25 RFC", "0.1");
        let s = summarize(input(&rows, &columns, &overlay, ALLOW_ALL, OrgUnit::Branch));
        assert_eq!(s.post, PostEligibility::Eligible);
        assert!(s.modified.contains("M1_B1"));
    }

    #[test]
    fn summary_is_idempotent() {
        let columns = cols(&["Jan-25 RFC", "Feb-25 RFC"]);
        let rows = vec![
            row(json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": 4, "Feb-25 RFC": null})),
            row(json!({"Material": "M2", "Branch": "B1"})),
        ];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[1], "Feb-25 RFC", "7");
        let i = input(&rows, &columns, &overlay, ALLOW_ALL, OrgUnit::Branch);
        assert_eq!(summarize(i), summarize(i));
    }

    #[test]
    fn touched_needs_one_filled_column_full_needs_all() {
        let columns = cols(&["Jan-25 RFC", "Feb-25 RFC"]);
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": 4}))];
        let overlay = EditOverlay::new();
        let status = row_status(&rows[0], &columns, &overlay);
        assert!(status.touched);
        assert!(!status.fully_filled);
        assert!(!status.edited);
    }

    #[test]
    fn invalid_text_does_not_fill_a_cell() {
        let columns = cols(&["Jan-25 RFC"]);
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1"}))];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Jan-25 RFC", "lots");
        let status = row_status(&rows[0], &columns, &overlay);
        assert!(!status.touched);
        assert!(status.edited);
    }

    #[test]
    fn empty_data_blocks_post() {
        let columns = cols(&["Jan-25 RFC"]);
        let overlay = EditOverlay::new();
        let s = summarize(input(&[], &columns, &overlay, ALLOW_ALL, OrgUnit::Branch));
        assert_eq!(s.post, PostEligibility::NoRows);
        assert!(!s.save_eligible);

        let rows = vec![row(json!({"Material": "M1", "Branch": "B1"}))];
        let s = summarize(input(&rows, &[], &overlay, ALLOW_ALL, OrgUnit::Branch));
        assert_eq!(s.post, PostEligibility::NoForecastColumns);
        assert!(s.fully_filled.contains("M1_B1"));
    }

    #[test]
    fn post_requires_permission() {
        let columns = cols(&["Jan-25 RFC"]);
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": 3}))];
        let overlay = EditOverlay::new();
        let s = summarize(input(&rows, &columns, &overlay, PermissionConfig::default(), OrgUnit::Branch));
        assert_eq!(s.post, PostEligibility::NotPermitted);
        assert!(s.save_eligible);
    }

    #[test]
    fn every_row_edited_rule_ignores_server_values() {
        let columns = cols(&["Jan-25 RFC", "Feb-25 RFC"]);
        let rows = vec![
            row(json!({"Material": "M1", "Jan-25 RFC": 3, "Feb-25 RFC": 3})),
            row(json!({"Material": "M2"})),
        ];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[1], "Jan-25 RFC", "5");
        let s = summarize(input(&rows, &columns, &overlay, ALLOW_ALL, OrgUnit::Dawlance));
        assert_eq!(s.post, PostEligibility::RowsIncomplete { incomplete: 1 });

        overlay.set_value(&rows[0], "Feb-25 RFC", "2");
        let s = summarize(input(&rows, &columns, &overlay, ALLOW_ALL, OrgUnit::Dawlance));
        assert_eq!(s.post, PostEligibility::Eligible);
    }

    #[test]
    fn permission_gates_save_only_when_policy_says_so() {
        let columns = cols(&["Jan-25 RFC"]);
        let rows = vec![row(json!({"Material": "M1"}))];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Jan-25 RFC", "9");
        let locked = PermissionConfig::default();
        assert!(summarize(input(&rows, &columns, &overlay, locked, OrgUnit::Marketing)).save_eligible);
        assert!(!summarize(input(&rows, &columns, &overlay, locked, OrgUnit::Dawlance)).save_eligible);
    }
}
