// src/forecast/definitions/org_unit.rs
use serde::{Deserialize, Serialize};
use std::fmt;

use super::column_classifier::ForecastSuffixRule;

/// Organizational unit whose forecast is being entered. Each unit has its own
/// endpoint family and reconciliation policy.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OrgUnit {
    #[default]
    Branch,
    Marketing,
    Dawlance,
}

impl OrgUnit {
    pub const ALL: [OrgUnit; 3] = [OrgUnit::Branch, OrgUnit::Marketing, OrgUnit::Dawlance];

    pub fn slug(self) -> &'static str {
        match self {
            OrgUnit::Branch => "branch",
            OrgUnit::Marketing => "marketing",
            OrgUnit::Dawlance => "dawlance",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            OrgUnit::Branch => "Branch",
            OrgUnit::Marketing => "Marketing",
            OrgUnit::Dawlance => "Dawlance",
        }
    }

    pub fn requires_branch(self) -> bool {
        matches!(self, OrgUnit::Branch)
    }

    /// `GET` fetches rows, `POST` posts the finalized forecast.
    pub fn rows_path(self) -> String {
        format!("/{}-rfc", self.slug())
    }

    pub fn summary_path(self) -> String {
        format!("/{}-rfc-product", self.slug())
    }

    pub fn save_path(self) -> String {
        format!("/{}-rfc-save", self.slug())
    }

    pub fn default_policy(self) -> Policy {
        match self {
            OrgUnit::Branch | OrgUnit::Marketing => Policy {
                post_rule: PostRule::AllColumnsFilled,
                save_gated_by_permission: false,
                change_set_mode: ChangeSetMode::Summed,
                forecast_suffix: ForecastSuffixRule::Trimmed,
            },
            OrgUnit::Dawlance => Policy {
                post_rule: PostRule::EveryRowEdited,
                save_gated_by_permission: true,
                change_set_mode: ChangeSetMode::PerColumnReversed,
                forecast_suffix: ForecastSuffixRule::Trimmed,
            },
        }
    }
}

impl fmt::Display for OrgUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// What must hold for every row before a period may be posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostRule {
    /// Every forecast column of every row is non-empty and non-zero.
    AllColumnsFilled,
    /// Every row carries at least one non-blank edit.
    EveryRowEdited,
}

/// Shape of the save payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeSetMode {
    /// One `rfc` field per row holding the sum of its forecast values.
    Summed,
    /// One `rfc-N` field per forecast column, `rfc-0` being the latest.
    PerColumnReversed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub post_rule: PostRule,
    pub save_gated_by_permission: bool,
    pub change_set_mode: ChangeSetMode,
    #[serde(default)]
    pub forecast_suffix: ForecastSuffixRule,
}
