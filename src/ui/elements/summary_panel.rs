// src/ui/elements/summary_panel.rs
use bevy_egui::egui;

use crate::forecast::engine::ForecastGrid;
use crate::ui::widgets::read_only_rows_table;

/// Product-level summary for the current period, read-only.
pub fn show_summary_panel(ctx: &egui::Context, grid: &ForecastGrid) {
    egui::TopBottomPanel::bottom("forecast_summary_panel")
        .resizable(true)
        .default_height(180.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Summary");
                ui.weak(format!("{} row(s)", grid.summary_rows().len()));
            });
            ui.separator();
            let height = ui.available_height();
            read_only_rows_table(ui, "summary_table", grid.summary_rows(), height);
        });
}
