// src/cli/push.rs
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::rows::print_grid;
use super::{connect, load_grid, CliError};
use crate::forecast::definitions::forecast_row::value_to_text;
use crate::forecast::definitions::{OrgUnit, Selection};

/// One `(row key, column, raw value)` edit from an overlay file.
pub type OverlayEdit = (String, String, String);

/// Reads `{ "M1_B1": { "Jan-25 RFC": 10, ... }, ... }`. Values may be numbers
/// or strings; null means blank.
pub fn parse_overlay(text: &str) -> Result<Vec<OverlayEdit>, CliError> {
    let parsed: BTreeMap<String, BTreeMap<String, Value>> =
        serde_json::from_str(text).map_err(|e| CliError::Overlay(e.to_string()))?;
    let mut edits = Vec::new();
    for (row_key, columns) in parsed {
        for (column, value) in columns {
            match value {
                Value::Array(_) | Value::Object(_) => {
                    return Err(CliError::Overlay(format!(
                        "{} / {}: expected a number or string",
                        row_key, column
                    )))
                }
                other => edits.push((row_key.clone(), column, value_to_text(&other))),
            }
        }
    }
    Ok(edits)
}

pub async fn push_overlay(
    unit: OrgUnit,
    selection: Selection,
    overlay_path: &Path,
    post: bool,
) -> Result<(), CliError> {
    let text = std::fs::read_to_string(overlay_path)
        .map_err(|e| CliError::Overlay(format!("{}: {}", overlay_path.display(), e)))?;
    let edits = parse_overlay(&text)?;
    println!("Loaded {} edit(s) from {}", edits.len(), overlay_path.display());

    let (settings, api) = connect()?;
    let (mut grid, now) = load_grid(&settings, &api, unit, selection).await?;

    let mut rejected = 0usize;
    for (row_key, column, value) in edits {
        if let Err(e) = grid.edit_cell(&row_key, &column, value, now) {
            println!("Skipped {} / {}: {}", row_key, column, e);
            rejected += 1;
        }
    }
    if rejected > 0 {
        println!("{} edit(s) skipped.", rejected);
    }
    print_grid(&grid);
    println!();

    if post {
        let request = grid.request_post()?;
        let result = api
            .post_forecast(request.unit, &request.selection, &request.rows, &request.records)
            .await;
        grid.post_completed(request.generation, result.clone().map_err(|e| e.to_string()), now);
        result?;
        println!(
            "Posted {} row(s) with {} change record(s).",
            request.rows.len(),
            request.records.len()
        );
    } else {
        let request = grid.request_save()?;
        let result = api
            .save_changes(request.unit, &request.selection, &request.records)
            .await;
        grid.save_completed(request.generation, result.clone().map_err(|e| e.to_string()), now);
        result?;
        println!("Saved {} change record(s).", request.records.len());
    }
    Ok(())
}
