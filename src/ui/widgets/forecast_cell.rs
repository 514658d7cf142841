// src/ui/widgets/forecast_cell.rs
use bevy_egui::egui::{self, Color32};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CellOutcome {
    /// New text when the user typed this frame.
    pub edited: Option<String>,
    /// Focus left the cell (click away, Enter, Escape).
    pub committed: bool,
}

/// Single-line editor for one forecast cell. Invalid text is drawn red with
/// the warning on hover.
pub fn forecast_cell_widget(
    ui: &mut egui::Ui,
    id: egui::Id,
    current: &str,
    enabled: bool,
    warning: Option<&str>,
) -> CellOutcome {
    let mut text = current.to_string();
    let mut edit = egui::TextEdit::singleline(&mut text)
        .id(id)
        .desired_width(f32::INFINITY)
        .horizontal_align(egui::Align::RIGHT);
    if warning.is_some() {
        edit = edit.text_color(Color32::RED);
    }
    let mut response = ui.add_enabled(enabled, edit);
    if let Some(warning) = warning {
        response = response.on_hover_text(warning);
    }

    let mut outcome = CellOutcome::default();
    if response.changed() && text != current {
        outcome.edited = Some(text);
    }
    if response.lost_focus() {
        outcome.committed = true;
    }
    outcome
}
