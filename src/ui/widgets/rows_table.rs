// src/ui/widgets/rows_table.rs
use bevy_egui::egui;
use egui_extras::{Column, TableBuilder};

use crate::forecast::definitions::{derive_columns, ForecastRow};

/// Read-only table for summary and history rows, columns ordered like the
/// main grid.
pub fn read_only_rows_table(ui: &mut egui::Ui, id_salt: &str, rows: &[ForecastRow], max_height: f32) {
    if rows.is_empty() {
        ui.weak("No rows.");
        return;
    }
    let columns = derive_columns(rows);
    let row_height = ui.text_style_height(&egui::TextStyle::Body) + ui.style().spacing.item_spacing.y;

    ui.push_id(id_salt, |ui| {
        egui::ScrollArea::horizontal().show(ui, |ui| {
            let mut table_builder = TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .max_scroll_height(max_height)
                .min_scrolled_height(0.0);
            for _ in &columns {
                table_builder = table_builder.column(Column::initial(100.0).at_least(40.0).clip(true));
            }
            table_builder
                .header(20.0, |mut header| {
                    for column in &columns {
                        header.col(|ui| {
                            ui.strong(&column.label);
                        });
                    }
                })
                .body(|body| {
                    body.rows(row_height, rows.len(), |mut row| {
                        let data = &rows[row.index()];
                        for column in &columns {
                            row.col(|ui| {
                                ui.label(data.text(&column.key));
                            });
                        }
                    });
                });
        });
    });
}
