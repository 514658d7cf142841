// src/ui/mod.rs
use bevy::prelude::*;
use bevy_egui::EguiContextPass;

pub mod elements;
pub mod state;
pub mod systems;
pub mod widgets;

use elements::main_view::forecast_desk_ui;
use state::DeskUiState;
use systems::{handle_post_blocked_alerts, handle_ui_feedback};

#[derive(Resource, Default, Debug, Clone)]
pub struct UiFeedbackState {
    pub last_message: String,
    pub is_error: bool,
}

/// Plugin for the forecast editor window.
pub struct DeskUiPlugin;

impl Plugin for DeskUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiFeedbackState>()
            .init_resource::<DeskUiState>()
            .add_systems(Update, (handle_ui_feedback, handle_post_blocked_alerts))
            .add_systems(EguiContextPass, forecast_desk_ui);

        info!("DeskUiPlugin initialized.");
    }
}
