// src/ui/elements/popups/history_popup.rs
use bevy_egui::egui;

use crate::forecast::resources::MaterialHistoryState;
use crate::ui::widgets::read_only_rows_table;

pub fn show_history_popup(ctx: &egui::Context, history: &mut MaterialHistoryState) {
    if !history.open {
        return;
    }
    let mut is_window_open = true;

    egui::Window::new(format!("History: {}", history.material))
        .collapsible(false)
        .resizable(true)
        .default_width(640.0)
        .open(&mut is_window_open)
        .show(ctx, |ui| {
            if history.loading {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            } else if let Some(error) = &history.error {
                ui.colored_label(egui::Color32::RED, error);
            } else {
                read_only_rows_table(ui, "history_table", &history.rows, 360.0);
            }
        });

    if !is_window_open {
        *history = MaterialHistoryState::default();
    }
}
