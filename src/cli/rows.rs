// src/cli/rows.rs
use super::{connect, load_grid, CliError};
use crate::forecast::definitions::{OrgUnit, Selection};
use crate::forecast::engine::ForecastGrid;

pub async fn print_rows(unit: OrgUnit, selection: Selection) -> Result<(), CliError> {
    let (settings, api) = connect()?;
    println!("=== {} forecast, {:?} ===\n", unit, selection);
    let (grid, _) = load_grid(&settings, &api, unit, selection).await?;
    print_grid(&grid);
    Ok(())
}

pub(crate) fn print_grid(grid: &ForecastGrid) {
    let columns = grid.columns();
    println!("Columns ({}), forecast columns marked with *:", columns.len());
    for column in columns {
        let mark = if grid.is_forecast_column(&column.key) { "*" } else { " " };
        println!("  {} {}", mark, column.label);
    }
    println!();

    let header: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    println!("{}", header.join("\t"));
    for row in grid.rows() {
        let cells: Vec<String> = columns
            .iter()
            .map(|c| grid.effective_value(row, &c.key))
            .collect();
        println!("{}", cells.join("\t"));
    }
    println!();

    let permission = grid.permission();
    let summary = grid.modification_summary();
    println!(
        "Permission: post {}, save {}",
        if permission.post_allowed { "allowed" } else { "locked" },
        if permission.save_allowed { "allowed" } else { "locked" }
    );
    println!(
        "Rows: {} total, {} with forecasts, {} fully filled",
        summary.row_count,
        summary.modified.len(),
        summary.fully_filled.len()
    );
    println!("Post: {}", summary.post);
    println!("Summary rows: {}", grid.summary_rows().len());
    for warning in grid.cell_warnings() {
        println!("Warning: {}", warning);
    }
}
