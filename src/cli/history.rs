// src/cli/history.rs
use super::{connect, CliError};
use crate::forecast::definitions::{derive_columns, Selection};

pub async fn print_history(material: &str, selection: Selection) -> Result<(), CliError> {
    let (_, api) = connect()?;
    println!("=== History for {} ===\n", material.trim());
    let rows = api.fetch_history(material, &selection).await?;
    if rows.is_empty() {
        println!("No history rows.");
        return Ok(());
    }
    let columns = derive_columns(&rows);
    let header: Vec<&str> = columns.iter().map(|c| c.label.as_str()).collect();
    println!("{}", header.join("\t"));
    for row in &rows {
        let cells: Vec<String> = columns.iter().map(|c| row.text(&c.key)).collect();
        println!("{}", cells.join("\t"));
    }
    println!("\n{} row(s)", rows.len());
    Ok(())
}
