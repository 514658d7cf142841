// src/ui/elements/popups/filter_popup.rs
use bevy_egui::egui;

use crate::forecast::engine::ForecastGrid;
use crate::ui::state::DeskUiState;

pub fn show_filter_popup(ctx: &egui::Context, state: &mut DeskUiState, grid: &mut ForecastGrid) {
    let Some(popup) = state.filter_popup.as_mut() else {
        return;
    };
    let mut is_window_open = true;
    let mut apply = false;
    let mut clear = false;

    egui::Window::new(format!("Filter: {}", popup.column.trim()))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut is_window_open)
        .show(ctx, |ui| {
            ui.add(egui::TextEdit::singleline(&mut popup.search).hint_text("Search values"));
            ui.horizontal(|ui| {
                if ui.small_button("All").clicked() {
                    popup.values.iter_mut().for_each(|(_, c)| *c = true);
                }
                if ui.small_button("None").clicked() {
                    popup.values.iter_mut().for_each(|(_, c)| *c = false);
                }
            });
            ui.separator();
            let needle = popup.search.trim().to_lowercase();
            egui::ScrollArea::vertical().max_height(300.0).show(ui, |ui| {
                for (value, checked) in popup.values.iter_mut() {
                    if !needle.is_empty() && !value.to_lowercase().contains(&needle) {
                        continue;
                    }
                    let label = if value.is_empty() { "(blank)" } else { value.as_str() };
                    ui.checkbox(checked, label);
                }
            });
            ui.separator();
            ui.horizontal(|ui| {
                if ui.button("Apply").clicked() {
                    apply = true;
                }
                if ui.button("Clear").clicked() {
                    clear = true;
                }
            });
        });

    if apply {
        // Everything checked means no filter at all.
        if popup.all_checked() {
            grid.filters_mut().clear(&popup.column);
        } else {
            let column = popup.column.clone();
            let values = popup.checked_values();
            grid.filters_mut().set(&column, values);
        }
    } else if clear {
        grid.filters_mut().clear(&popup.column);
    }
    if apply || clear || !is_window_open {
        state.filter_popup = None;
    }
}
