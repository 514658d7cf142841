// src/ui/elements/top_panel.rs
use bevy_egui::egui;
use chrono::Datelike;

use super::main_view::ForecastEventWriters;
use crate::forecast::definitions::{OrgUnit, Selection};
use crate::forecast::engine::{ForecastGrid, GridPhase};
use crate::forecast::events::{
    RequestChangeSelection, RequestPostForecast, RequestRefresh, RequestSaveForecast,
    RequestSelectUnit,
};
use crate::settings::AppSettings;
use crate::ui::state::{DeskUiState, SettingsDraft};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

fn branch_hint(unit: OrgUnit) -> &'static str {
    if unit.requires_branch() {
        "code"
    } else {
        "optional"
    }
}

/// Blank input clears the branch filter.
fn branch_from_input(input: String) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input)
    }
}

pub fn show_top_panel(
    ui: &mut egui::Ui,
    state: &mut DeskUiState,
    grid: &mut ForecastGrid,
    settings: &AppSettings,
    writers: &mut ForecastEventWriters,
) {
    ui.horizontal(|ui| {
        show_unit_selector(ui, grid.unit(), writers);
        ui.separator();
        show_selection_controls(ui, state, grid, writers);
        ui.separator();

        if ui
            .add_enabled(grid.phase() != GridPhase::Idle, egui::Button::new("Refresh"))
            .clicked()
        {
            writers.refresh.write(RequestRefresh);
        }
        let save_label = if grid.is_saving() { "Saving..." } else { "Save" };
        if ui.add_enabled(grid.can_save(), egui::Button::new(save_label)).clicked() {
            writers.save.write(RequestSaveForecast);
        }
        let post_label = if grid.is_posting() { "Posting..." } else { "Post" };
        if ui.add_enabled(grid.can_post(), egui::Button::new(post_label)).clicked() {
            writers.post.write(RequestPostForecast);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Settings").clicked() {
                state.settings_draft = SettingsDraft::from_settings(settings);
                state.show_settings_popup = true;
            }
            ui.toggle_value(&mut state.show_summary, "Summary");
        });
    });

    ui.horizontal(|ui| {
        show_status_line(ui, grid);
        let active = grid.filters().active_count();
        if active > 0 {
            ui.separator();
            ui.label(format!("{} filter(s) active", active));
            if ui.small_button("Clear filters").clicked() {
                grid.filters_mut().clear_all();
            }
        }
    });
}

fn show_unit_selector(ui: &mut egui::Ui, current: OrgUnit, writers: &mut ForecastEventWriters) {
    let mut selected = current;
    egui::ComboBox::from_id_salt("unit_selector")
        .selected_text(current.display_name())
        .show_ui(ui, |ui| {
            for unit in OrgUnit::ALL {
                ui.selectable_value(&mut selected, unit, unit.display_name());
            }
        });
    if selected != current {
        writers.select_unit.write(RequestSelectUnit { unit: selected });
    }
}

fn show_selection_controls(
    ui: &mut egui::Ui,
    state: &mut DeskUiState,
    grid: &ForecastGrid,
    writers: &mut ForecastEventWriters,
) {
    let draft = state.selection_draft.get_or_insert_with(|| {
        grid.selection()
            .cloned()
            .unwrap_or_else(|| Selection::for_date(chrono::Local::now().date_naive()))
    });
    let before = draft.clone();

    ui.label("Branch:");
    let mut branch = draft.branch.clone().unwrap_or_default();
    ui.add(
        egui::TextEdit::singleline(&mut branch)
            .desired_width(90.0)
            .hint_text(branch_hint(grid.unit())),
    );
    draft.branch = branch_from_input(branch);

    ui.label("Month:");
    egui::ComboBox::from_id_salt("month_selector")
        .selected_text(month_name(draft.month))
        .show_ui(ui, |ui| {
            for month in 1..=12u32 {
                ui.selectable_value(&mut draft.month, month, month_name(month));
            }
        });
    ui.label("Year:");
    let this_year = chrono::Local::now().year();
    ui.add(egui::DragValue::new(&mut draft.year).range((this_year - 5)..=(this_year + 2)));

    if *draft != before {
        writers.change_selection.write(RequestChangeSelection {
            selection: draft.clone(),
        });
    }
}

fn show_status_line(ui: &mut egui::Ui, grid: &ForecastGrid) {
    let phase = grid.phase();
    match phase {
        GridPhase::Loading | GridPhase::Saving | GridPhase::Posting => {
            ui.spinner();
        }
        _ => {}
    }
    ui.label(format!("{}", phase));
    if phase == GridPhase::Idle {
        if grid.unit().requires_branch() {
            ui.weak("Enter a branch to load forecasts.");
        }
        return;
    }
    let summary = grid.modification_summary();
    ui.separator();
    ui.label(format!(
        "{} of {} row(s) with forecasts, {} fully filled, {} edited",
        summary.modified.len(),
        summary.row_count,
        summary.fully_filled.len(),
        summary.edited_rows
    ));
    ui.separator();
    if summary.post.is_eligible() {
        ui.colored_label(egui::Color32::LIGHT_GREEN, "Ready to post");
    } else {
        ui.weak(format!("Post: {}", summary.post));
    }
    if grid.autosave_pending() {
        ui.separator();
        ui.weak("Unsaved changes");
    } else if grid.is_autosaving() {
        ui.separator();
        ui.weak("Autosaving...");
    }
    let warnings = grid.cell_warnings().len();
    if warnings > 0 {
        ui.separator();
        ui.colored_label(egui::Color32::RED, format!("{} invalid cell(s)", warnings));
    }
    if let Some(error) = grid.last_error() {
        ui.separator();
        ui.colored_label(egui::Color32::RED, error);
    }
}
