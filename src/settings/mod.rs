// src/settings/mod.rs
pub mod io;

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::forecast::definitions::{OrgUnit, Policy};
use crate::forecast::engine::{AutosaveScheduler, GridTimings, InvalidNumberPolicy};

pub const BASE_URL_ENV_VAR: &str = "FORECAST_API_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Resource)]
#[serde(default)]
pub struct AppSettings {
    pub api_base_url: Option<String>,
    pub request_timeout_secs: u64,
    pub autosave_delay_ms: u64,
    pub fetch_debounce_ms: u64,
    pub invalid_numbers: InvalidNumberPolicy,
    pub default_unit: OrgUnit,
    /// Keyed by unit slug (`branch`, `marketing`, `dawlance`).
    pub policy_overrides: BTreeMap<String, Policy>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: 30,
            autosave_delay_ms: AutosaveScheduler::DEFAULT_DELAY.as_millis() as u64,
            fetch_debounce_ms: 500,
            invalid_numbers: InvalidNumberPolicy::default(),
            default_unit: OrgUnit::default(),
            policy_overrides: BTreeMap::new(),
        }
    }
}

impl AppSettings {
    /// Environment, then the settings file, then the local default.
    pub fn resolved_base_url(&self) -> String {
        let from_env = std::env::var(BASE_URL_ENV_VAR).ok();
        pick_base_url(from_env.as_deref(), self.api_base_url.as_deref())
    }

    pub fn policy_for(&self, unit: OrgUnit) -> Policy {
        self.policy_overrides
            .get(unit.slug())
            .copied()
            .unwrap_or_else(|| unit.default_policy())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn timings(&self) -> GridTimings {
        GridTimings {
            fetch_debounce: Duration::from_millis(self.fetch_debounce_ms),
            autosave_delay: Duration::from_millis(self.autosave_delay_ms),
        }
    }
}

fn pick_base_url(from_env: Option<&str>, from_file: Option<&str>) -> String {
    [from_env, from_file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::definitions::{ChangeSetMode, PostRule};

    #[test]
    fn partial_file_keeps_defaults() {
        let s: AppSettings = serde_json::from_str(r#"{"autosave_delay_ms": 1000}"#).unwrap();
        assert_eq!(s.autosave_delay_ms, 1000);
        assert_eq!(s.request_timeout_secs, 30);
        assert_eq!(s.timings().fetch_debounce, Duration::from_millis(500));
    }

    #[test]
    fn base_url_precedence() {
        assert_eq!(pick_base_url(Some("http://env"), Some("http://file")), "http://env");
        assert_eq!(pick_base_url(Some("  "), Some("http://file")), "http://file");
        assert_eq!(pick_base_url(None, None), DEFAULT_BASE_URL);
    }

    #[test]
    fn policy_override_by_slug() {
        let s: AppSettings = serde_json::from_str(
            r#"{"policy_overrides": {"marketing": {"post_rule": "every_row_edited", "save_gated_by_permission": true, "change_set_mode": "per_column_reversed"}}}"#,
        )
        .unwrap();
        let p = s.policy_for(OrgUnit::Marketing);
        assert_eq!(p.post_rule, PostRule::EveryRowEdited);
        assert_eq!(p.change_set_mode, ChangeSetMode::PerColumnReversed);
        assert_eq!(s.policy_for(OrgUnit::Branch), OrgUnit::Branch.default_policy());
    }

    #[test]
    fn reject_policy_reads_from_file() {
        let s: AppSettings = serde_json::from_str(r#"{"invalid_numbers": "reject", "default_unit": "dawlance"}"#).unwrap();
        assert_eq!(s.invalid_numbers, InvalidNumberPolicy::Reject);
        assert_eq!(s.default_unit, OrgUnit::Dawlance);
    }
}
