// src/ui/state.rs
use bevy::prelude::*;

use crate::forecast::definitions::Selection;
use crate::forecast::engine::InvalidNumberPolicy;
use crate::settings::AppSettings;

/// Allow-list being edited in the column filter popup.
#[derive(Debug, Clone, Default)]
pub struct FilterPopupState {
    pub column: String,
    pub search: String,
    /// Distinct values of the column with their checked state.
    pub values: Vec<(String, bool)>,
}

impl FilterPopupState {
    pub fn checked_values(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|(_, checked)| *checked)
            .map(|(v, _)| v.clone())
            .collect()
    }

    pub fn all_checked(&self) -> bool {
        self.values.iter().all(|(_, checked)| *checked)
    }
}

/// Editable copy of the connection settings.
#[derive(Debug, Clone, Default)]
pub struct SettingsDraft {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub autosave_delay_ms: u64,
    pub fetch_debounce_ms: u64,
    pub invalid_numbers: InvalidNumberPolicy,
    pub new_token_input: String,
    /// Outcome of the last save/token action, `(message, is_error)`.
    pub status: Option<(String, bool)>,
}

impl SettingsDraft {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            api_base_url: settings.api_base_url.clone().unwrap_or_default(),
            request_timeout_secs: settings.request_timeout_secs,
            autosave_delay_ms: settings.autosave_delay_ms,
            fetch_debounce_ms: settings.fetch_debounce_ms,
            invalid_numbers: settings.invalid_numbers,
            new_token_input: String::new(),
            status: None,
        }
    }

    pub fn apply_to(&self, settings: &mut AppSettings) {
        let url = self.api_base_url.trim();
        settings.api_base_url = (!url.is_empty()).then(|| url.to_string());
        settings.request_timeout_secs = self.request_timeout_secs.max(1);
        settings.autosave_delay_ms = self.autosave_delay_ms;
        settings.fetch_debounce_ms = self.fetch_debounce_ms;
        settings.invalid_numbers = self.invalid_numbers;
    }
}

#[derive(Resource, Debug, Default)]
pub struct DeskUiState {
    /// Selection as shown in the top panel; pushed to the grid on change.
    pub selection_draft: Option<Selection>,
    pub filter_popup: Option<FilterPopupState>,
    pub alert_message: Option<String>,
    pub show_settings_popup: bool,
    pub settings_draft: SettingsDraft,
    pub show_summary: bool,
}
