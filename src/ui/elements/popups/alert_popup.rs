// src/ui/elements/popups/alert_popup.rs
use bevy_egui::egui;

use crate::ui::state::DeskUiState;

/// Blocks the editor until the message is acknowledged.
pub fn show_alert_popup(ctx: &egui::Context, state: &mut DeskUiState) {
    let Some(message) = state.alert_message.clone() else {
        return;
    };
    let mut acknowledged = false;

    egui::Modal::new(egui::Id::new("post_blocked_alert")).show(ctx, |ui| {
        ui.set_width(320.0);
        ui.heading("Cannot post");
        ui.separator();
        ui.label(message);
        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            if ui.button("OK").clicked() {
                acknowledged = true;
            }
        });
    });

    if acknowledged {
        state.alert_message = None;
    }
}
