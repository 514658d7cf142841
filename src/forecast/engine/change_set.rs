// src/forecast/engine/change_set.rs
//! Turns the overlay into the save/post payloads.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use serde_json::{Number, Value};
use std::fmt;

use super::overlay::EditOverlay;
use crate::forecast::definitions::{CellValue, ChangeSetMode, ForecastRow, RowKey};

/// What happens to cells holding non-numeric text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidNumberPolicy {
    /// Serialize the cell as blank and keep going.
    #[default]
    CoerceToBlank,
    /// Refuse to save or post while any such cell exists.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWarning {
    pub row_key: RowKey,
    pub material: String,
    pub column: String,
    pub raw: String,
}

impl fmt::Display for CellWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}: '{}' is not a number",
            self.material, self.column, self.raw
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChangeFields {
    Summed { rfc: f64 },
    /// `(field name, value)` pairs, `rfc-0` first.
    PerColumn(Vec<(String, f64)>),
}

/// One element of the save payload: `{ material, ...forecast fields }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub material: String,
    pub fields: ChangeFields,
}

impl Serialize for ChangeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("material", &self.material)?;
        match &self.fields {
            ChangeFields::Summed { rfc } => map.serialize_entry("rfc", &json_number(*rfc))?,
            ChangeFields::PerColumn(fields) => {
                for (name, value) in fields {
                    map.serialize_entry(name, &json_number(*value))?;
                }
            }
        }
        map.end()
    }
}

/// Whole numbers become JSON integers so the backend sees `8`, not `8.0`.
pub fn json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        Value::Number(Number::from(value as i64))
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

fn coerced(row: &ForecastRow, column: &str, overlay: &EditOverlay) -> Option<f64> {
    CellValue::classify(&overlay.effective_value(row, column)).as_number()
}

/// Records for every row with at least one overlay entry, in row order.
pub fn build_change_set(
    rows: &[ForecastRow],
    forecast_columns: &[String],
    overlay: &EditOverlay,
    mode: ChangeSetMode,
) -> Vec<ChangeRecord> {
    rows.iter()
        .filter(|row| overlay.has_entries(&row.key()))
        .filter_map(|row| {
            let fields = match mode {
                ChangeSetMode::Summed => {
                    let rfc: f64 = forecast_columns
                        .iter()
                        .filter_map(|col| coerced(row, col, overlay))
                        .sum();
                    if rfc == 0.0 {
                        return None;
                    }
                    ChangeFields::Summed { rfc }
                }
                ChangeSetMode::PerColumnReversed => ChangeFields::PerColumn(
                    forecast_columns
                        .iter()
                        .rev()
                        .enumerate()
                        .map(|(idx, col)| {
                            (format!("rfc-{}", idx), coerced(row, col, overlay).unwrap_or(0.0))
                        })
                        .collect(),
                ),
            };
            Some(ChangeRecord {
                material: row.material(),
                fields,
            })
        })
        .collect()
}

/// Full row set with overlay values written into the forecast columns, as
/// posted when a period is finalized. Blank and invalid cells post as `0`.
pub fn merged_rows(rows: &[ForecastRow], forecast_columns: &[String], overlay: &EditOverlay) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let mut fields = row.fields().clone();
            for column in forecast_columns {
                let value = coerced(row, column, overlay).unwrap_or(0.0);
                fields.insert(column.clone(), json_number(value));
            }
            Value::Object(fields)
        })
        .collect()
}

/// Forecast cells whose effective value is not a number.
pub fn cell_warnings(
    rows: &[ForecastRow],
    forecast_columns: &[String],
    overlay: &EditOverlay,
) -> Vec<CellWarning> {
    let mut warnings = Vec::new();
    for row in rows {
        for column in forecast_columns {
            let raw = overlay.effective_value(row, column);
            if CellValue::classify(&raw).is_invalid() {
                warnings.push(CellWarning {
                    row_key: row.key(),
                    material: row.material(),
                    column: column.clone(),
                    raw,
                });
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> ForecastRow {
        ForecastRow::from_value(value).unwrap()
    }

    fn cols() -> Vec<String> {
        vec!["Jan-25 RFC".to_string(), "Feb-25 RFC".to_string()]
    }

    #[test]
    fn summed_mode_collapses_columns() {
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1"}))];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Jan-25 RFC", "5");
        overlay.set_value(&rows[0], "Feb-25 RFC", "3");
        let records = build_change_set(&rows, &cols(), &overlay, ChangeSetMode::Summed);
        assert_eq!(
            records,
            vec![ChangeRecord {
                material: "M1".into(),
                fields: ChangeFields::Summed { rfc: 8.0 }
            }]
        );
        assert_eq!(
            serde_json::to_value(&records).unwrap(),
            json!([{"material": "M1", "rfc": 8}])
        );
    }

    #[test]
    fn summed_mode_drops_zero_rows_and_unedited_rows() {
        let rows = vec![
            row(json!({"Material": "M1", "Branch": "B1"})),
            row(json!({"Material": "M2", "Branch": "B1", "Jan-25 RFC": 9})),
        ];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Jan-25 RFC", "0");
        let records = build_change_set(&rows, &cols(), &overlay, ChangeSetMode::Summed);
        assert!(records.is_empty());
    }

    #[test]
    fn summed_mode_skips_invalid_text() {
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1"}))];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Jan-25 RFC", "abc");
        overlay.set_value(&rows[0], "Feb-25 RFC", "2.5");
        let records = build_change_set(&rows, &cols(), &overlay, ChangeSetMode::Summed);
        assert_eq!(records[0].fields, ChangeFields::Summed { rfc: 2.5 });
    }

    #[test]
    fn per_column_mode_fills_untouched_fields_from_row() {
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": 4, "Feb-25 RFC": "6"}))];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Jan-25 RFC", "10");
        let records = build_change_set(&rows, &cols(), &overlay, ChangeSetMode::PerColumnReversed);
        assert_eq!(
            records[0].fields,
            ChangeFields::PerColumn(vec![("rfc-0".into(), 6.0), ("rfc-1".into(), 10.0)])
        );
        assert_eq!(
            serde_json::to_value(&records[0]).unwrap(),
            json!({"material": "M1", "rfc-0": 6, "rfc-1": 10})
        );
    }

    #[test]
    fn per_column_mode_never_emits_nan() {
        let rows = vec![row(json!({"Material": "M1"}))];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Feb-25 RFC", "n/a");
        let records = build_change_set(&rows, &cols(), &overlay, ChangeSetMode::PerColumnReversed);
        assert_eq!(
            records[0].fields,
            ChangeFields::PerColumn(vec![("rfc-0".into(), 0.0), ("rfc-1".into(), 0.0)])
        );
    }

    #[test]
    fn merged_rows_substitute_overlay_values() {
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": "2", "Product": "AC"}))];
        let mut overlay = EditOverlay::new();
        overlay.set_value(&rows[0], "Feb-25 RFC", "1.5");
        let merged = merged_rows(&rows, &cols(), &overlay);
        assert_eq!(
            merged,
            vec![json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": 2, "Product": "AC", "Feb-25 RFC": 1.5})]
        );
    }

    #[test]
    fn warnings_point_at_invalid_cells() {
        let rows = vec![row(json!({"Material": "M1", "Branch": "B1", "Jan-25 RFC": "x"}))];
        let overlay = EditOverlay::new();
        let warnings = cell_warnings(&rows, &cols(), &overlay);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].column, "Jan-25 RFC");
        assert_eq!(warnings[0].row_key, "M1_B1");
    }

    #[test]
    fn json_number_keeps_integers_integral() {
        assert_eq!(json_number(8.0), json!(8));
        assert_eq!(json_number(-3.0), json!(-3));
        assert_eq!(json_number(0.25), json!(0.25));
    }
}
