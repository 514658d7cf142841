// src/ui/elements/grid_table.rs
use bevy_egui::egui;
use egui_extras::{Column, TableBody, TableBuilder, TableRow};
use std::collections::HashMap;

use super::main_view::ForecastEventWriters;
use crate::forecast::definitions::forecast_row::MATERIAL_FIELD;
use crate::forecast::definitions::{distinct_values, ForecastRow};
use crate::forecast::engine::{ForecastGrid, GridPhase};
use crate::forecast::events::{CellCommitEvent, CellEditedEvent, RequestMaterialHistory};
use crate::ui::state::{DeskUiState, FilterPopupState};
use crate::ui::widgets::forecast_cell_widget;

pub fn show_grid_table(
    ui: &mut egui::Ui,
    state: &mut DeskUiState,
    grid: &ForecastGrid,
    writers: &mut ForecastEventWriters,
) {
    if grid.rows().is_empty() {
        ui.vertical_centered(|ui| match grid.phase() {
            GridPhase::Idle => {
                ui.label("Choose a period to load forecasts.");
            }
            GridPhase::Loading => {
                ui.spinner();
            }
            _ => {
                ui.label("No rows for this period.");
            }
        });
        return;
    }

    let row_height = ui.text_style_height(&egui::TextStyle::Body) + ui.style().spacing.item_spacing.y + 4.0;
    let columns = grid.columns();

    egui::ScrollArea::horizontal()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            let mut table_builder = TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .min_scrolled_height(0.0);
            for column in columns {
                let width = if grid.is_forecast_column(&column.key) { 90.0 } else { 130.0 };
                table_builder = table_builder.column(Column::initial(width).at_least(40.0).clip(true));
            }
            table_builder
                .header(22.0, |mut header_row| {
                    grid_table_header(&mut header_row, state, grid);
                })
                .body(|body| {
                    grid_table_body(body, row_height, grid, writers);
                });
        });
}

fn grid_table_header(header_row: &mut TableRow, state: &mut DeskUiState, grid: &ForecastGrid) {
    for column in grid.columns() {
        header_row.col(|ui| {
            let active = grid.filters().is_active(&column.key);
            let label = egui::RichText::new(&column.label).strong();
            ui.label(if grid.is_forecast_column(&column.key) {
                label.color(ui.visuals().hyperlink_color)
            } else {
                label
            });
            let filter_button = egui::Button::new(if active { "⏷*" } else { "⏷" }).small();
            if ui.add(filter_button).on_hover_text("Filter values").clicked() {
                state.filter_popup = Some(open_filter_popup(grid, &column.key));
            }
        });
    }
}

pub(crate) fn open_filter_popup(grid: &ForecastGrid, column: &str) -> FilterPopupState {
    let allowed = grid.filters().allowed(column);
    FilterPopupState {
        column: column.to_string(),
        search: String::new(),
        values: distinct_values(grid.rows(), column)
            .into_iter()
            .map(|value| {
                let checked = allowed.map_or(true, |set| set.contains(&value));
                (value, checked)
            })
            .collect(),
    }
}

fn grid_table_body(body: TableBody, row_height: f32, grid: &ForecastGrid, writers: &mut ForecastEventWriters) {
    let visible = grid.visible_rows();
    let editable = matches!(grid.phase(), GridPhase::Ready | GridPhase::Editing);
    let warnings: HashMap<(String, String), String> = grid
        .cell_warnings()
        .into_iter()
        .map(|w| ((w.row_key.clone(), w.column.clone()), w.to_string()))
        .collect();

    body.rows(row_height, visible.len(), |mut table_row| {
        let Some(row) = visible.get(table_row.index()).and_then(|&i| grid.rows().get(i)) else {
            return;
        };
        let row_key = row.key();
        for column in grid.columns() {
            table_row.col(|ui| {
                if grid.is_forecast_column(&column.key) {
                    show_forecast_cell(ui, grid, row, &row_key, &column.key, editable, &warnings, writers);
                } else if column.key == MATERIAL_FIELD {
                    let material = row.material();
                    if ui.link(&material).on_hover_text("Show history").clicked() {
                        writers.history.write(RequestMaterialHistory { material });
                    }
                } else {
                    ui.label(row.text(&column.key));
                }
            });
        }
    });
}

#[allow(clippy::too_many_arguments)]
fn show_forecast_cell(
    ui: &mut egui::Ui,
    grid: &ForecastGrid,
    row: &ForecastRow,
    row_key: &str,
    column: &str,
    editable: bool,
    warnings: &HashMap<(String, String), String>,
    writers: &mut ForecastEventWriters,
) {
    let current = grid.effective_value(row, column);
    let warning = warnings.get(&(row_key.to_string(), column.to_string()));
    let id = egui::Id::new(("forecast_cell", row_key, column));
    let outcome = forecast_cell_widget(ui, id, &current, editable, warning.map(String::as_str));
    if let Some(value) = outcome.edited {
        writers.cell_edited.write(CellEditedEvent {
            row_key: row_key.to_string(),
            column: column.to_string(),
            value,
        });
    }
    if outcome.committed {
        writers.cell_commit.write(CellCommitEvent);
    }
}
