// src/ui/widgets/mod.rs
pub mod forecast_cell;
pub mod rows_table;

pub use forecast_cell::{forecast_cell_widget, CellOutcome};
pub use rows_table::read_only_rows_table;
