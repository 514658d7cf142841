// src/forecast/definitions/column_classifier.rs
//! Decides which backend columns are editable forecast cells.
//!
//! The backend sends no type tag for editable columns, so the decision rests
//! on label text alone. The matching rules below are exact; widening or
//! normalizing them changes which cells users can edit.

use serde::{Deserialize, Serialize};

use super::column_descriptor::ColumnDescriptor;

const FORECAST_MARKER: &str = "RFC";
const EXCLUDED_MARKERS: [&str; 3] = ["Branch", "Marketing", "Last"];

/// How the `RFC` suffix is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastSuffixRule {
    /// The key, after trimming, ends with `RFC`.
    #[default]
    Trimmed,
    /// The untrimmed key ends with `RFC ` (trailing space kept from upstream labels).
    TrailingSpace,
}

pub fn is_forecast_column(key: &str, rule: ForecastSuffixRule) -> bool {
    if !key.contains(FORECAST_MARKER) {
        return false;
    }
    if EXCLUDED_MARKERS.iter().any(|marker| key.contains(marker)) {
        return false;
    }
    match rule {
        ForecastSuffixRule::Trimmed => key.trim().ends_with(FORECAST_MARKER),
        ForecastSuffixRule::TrailingSpace => key.ends_with("RFC "),
    }
}

/// Keys of the editable forecast columns, in column order.
pub fn forecast_columns(columns: &[ColumnDescriptor], rule: ForecastSuffixRule) -> Vec<String> {
    columns
        .iter()
        .filter(|c| is_forecast_column(&c.key, rule))
        .map(|c| c.key.clone())
        .collect()
}
