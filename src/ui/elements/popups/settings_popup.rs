// src/ui/elements/popups/settings_popup.rs
use bevy::log::{error, info};
use bevy::prelude::EventWriter;
use bevy_egui::egui;

use crate::forecast::api::auth;
use crate::forecast::engine::InvalidNumberPolicy;
use crate::forecast::events::RequestReconnectApi;
use crate::settings::{io::save_settings_to_file, AppSettings};
use crate::ui::state::DeskUiState;

pub fn show_settings_popup(
    ctx: &egui::Context,
    state: &mut DeskUiState,
    settings: &mut AppSettings,
    auth_status: &str,
    reconnect: &mut EventWriter<RequestReconnectApi>,
) {
    if !state.show_settings_popup {
        return;
    }
    let mut is_window_open = true;
    let mut close_requested = false;
    let mut status_message: Option<(String, bool)> = None;

    egui::Window::new("Settings")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut is_window_open)
        .show(ctx, |ui| {
            let draft = &mut state.settings_draft;
            ui.heading("Connection");
            ui.separator();
            egui::Grid::new("settings_grid").num_columns(2).show(ui, |ui| {
                ui.label("API base URL:");
                ui.add(
                    egui::TextEdit::singleline(&mut draft.api_base_url)
                        .hint_text(settings.resolved_base_url())
                        .desired_width(260.0),
                );
                ui.end_row();
                ui.label("Request timeout (s):");
                ui.add(egui::DragValue::new(&mut draft.request_timeout_secs).range(1..=600));
                ui.end_row();
                ui.label("Autosave delay (ms):");
                ui.add(egui::DragValue::new(&mut draft.autosave_delay_ms).range(250..=60_000));
                ui.end_row();
                ui.label("Reload delay (ms):");
                ui.add(egui::DragValue::new(&mut draft.fetch_debounce_ms).range(0..=5_000));
                ui.end_row();
                ui.label("Non-numeric cells:");
                egui::ComboBox::from_id_salt("invalid_numbers")
                    .selected_text(match draft.invalid_numbers {
                        InvalidNumberPolicy::CoerceToBlank => "Treat as blank",
                        InvalidNumberPolicy::Reject => "Block save/post",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut draft.invalid_numbers, InvalidNumberPolicy::CoerceToBlank, "Treat as blank");
                        ui.selectable_value(&mut draft.invalid_numbers, InvalidNumberPolicy::Reject, "Block save/post");
                    });
                ui.end_row();
            });
            if ui.button("Save settings").clicked() {
                draft.apply_to(settings);
                status_message = Some(match save_settings_to_file(&*settings) {
                    Ok(()) => {
                        reconnect.write(RequestReconnectApi);
                        ("Settings saved. Timing changes apply when a unit is opened.".to_string(), false)
                    }
                    Err(e) => {
                        error!("Settings: save failed: {}", e);
                        (format!("Could not save settings: {}", e), true)
                    }
                });
            }

            ui.add_space(8.0);
            ui.heading("API token");
            ui.separator();
            ui.horizontal(|ui| {
                ui.label("Current status:");
                ui.label(auth_status);
            });
            ui.add(
                egui::TextEdit::singleline(&mut draft.new_token_input)
                    .password(true)
                    .desired_width(f32::INFINITY),
            );
            ui.horizontal(|ui| {
                if ui.button("Store token").clicked() {
                    status_message = Some(match auth::store_token(&draft.new_token_input) {
                        Ok(()) => {
                            draft.new_token_input.clear();
                            reconnect.write(RequestReconnectApi);
                            ("Token stored.".to_string(), false)
                        }
                        Err(e) => (e.to_string(), true),
                    });
                }
                if ui.button("Clear token").clicked() {
                    status_message = Some(match auth::clear_token() {
                        Ok(()) => {
                            reconnect.write(RequestReconnectApi);
                            ("Token cleared.".to_string(), false)
                        }
                        Err(e) => (e.to_string(), true),
                    });
                }
            });

            ui.separator();
            if let Some((message, is_error)) = &draft.status {
                let color = if *is_error { egui::Color32::RED } else { ui.visuals().text_color() };
                ui.colored_label(color, message);
            }
            if ui.button("Close").clicked() {
                close_requested = true;
            }
        });

    if let Some((message, is_error)) = status_message {
        if is_error {
            error!("Settings: {}", message);
        } else {
            info!("Settings: {}", message);
        }
        state.settings_draft.status = Some((message, is_error));
    }
    if !is_window_open || close_requested {
        state.show_settings_popup = false;
    }
}
