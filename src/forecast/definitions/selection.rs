// src/forecast/definitions/selection.rs
use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::org_unit::OrgUnit;

/// The (branch, month, year) context a grid session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub branch: Option<String>,
    pub month: u32,
    pub year: i32,
}

impl Selection {
    pub fn new(branch: Option<String>, month: u32, year: i32) -> Self {
        Self { branch, month, year }
    }

    /// Current month, no branch.
    pub fn for_date(date: chrono::NaiveDate) -> Self {
        Self::new(None, date.month(), date.year())
    }

    /// Branch with surrounding whitespace removed; blank counts as unset.
    pub fn branch(&self) -> Option<&str> {
        self.branch
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }

    pub fn is_complete_for(&self, unit: OrgUnit) -> bool {
        (1..=12).contains(&self.month) && (!unit.requires_branch() || self.branch().is_some())
    }

    /// Query parameters shared by the rows, summary, save and post calls.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("month", self.month.to_string()), ("year", self.year.to_string())];
        if let Some(branch) = self.branch() {
            pairs.push(("branch", branch.to_string()));
        }
        pairs
    }
}
