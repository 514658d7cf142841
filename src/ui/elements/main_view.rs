// src/ui/elements/main_view.rs
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use super::grid_table::show_grid_table;
use super::popups::{show_alert_popup, show_filter_popup, show_history_popup, show_settings_popup};
use super::summary_panel::show_summary_panel;
use super::top_panel::show_top_panel;
use crate::forecast::events::{
    CellCommitEvent, CellEditedEvent, RequestChangeSelection, RequestMaterialHistory,
    RequestPostForecast, RequestReconnectApi, RequestRefresh, RequestSaveForecast,
    RequestSelectUnit,
};
use crate::forecast::resources::{ActiveGrid, ApiHandle, MaterialHistoryState};
use crate::settings::AppSettings;
use crate::ui::{state::DeskUiState, UiFeedbackState};

/// Every request the editor window can emit.
#[derive(SystemParam)]
pub struct ForecastEventWriters<'w> {
    pub select_unit: EventWriter<'w, RequestSelectUnit>,
    pub change_selection: EventWriter<'w, RequestChangeSelection>,
    pub refresh: EventWriter<'w, RequestRefresh>,
    pub reconnect: EventWriter<'w, RequestReconnectApi>,
    pub cell_edited: EventWriter<'w, CellEditedEvent>,
    pub cell_commit: EventWriter<'w, CellCommitEvent>,
    pub save: EventWriter<'w, RequestSaveForecast>,
    pub post: EventWriter<'w, RequestPostForecast>,
    pub history: EventWriter<'w, RequestMaterialHistory>,
}

#[allow(clippy::too_many_arguments)]
pub fn forecast_desk_ui(
    mut contexts: EguiContexts,
    mut state: ResMut<DeskUiState>,
    grid: Option<ResMut<ActiveGrid>>,
    api: Option<Res<ApiHandle>>,
    settings: Option<ResMut<AppSettings>>,
    mut history: ResMut<MaterialHistoryState>,
    ui_feedback: Res<UiFeedbackState>,
    mut writers: ForecastEventWriters,
) {
    // Session resources appear after the startup system has run.
    let (Some(mut grid), Some(api), Some(mut settings)) = (grid, api, settings) else {
        return;
    };
    let ctx = contexts.ctx_mut();

    show_alert_popup(ctx, &mut state);
    show_filter_popup(ctx, &mut state, &mut grid);
    show_history_popup(ctx, &mut history);
    show_settings_popup(ctx, &mut state, &mut settings, api.auth_status, &mut writers.reconnect);

    egui::TopBottomPanel::top("forecast_top_panel").show(ctx, |ui| {
        show_top_panel(ui, &mut state, &mut grid, &settings, &mut writers);
        if !ui_feedback.last_message.is_empty() {
            let text_color = if ui_feedback.is_error {
                egui::Color32::RED
            } else {
                ui.style().visuals.text_color()
            };
            ui.colored_label(text_color, &ui_feedback.last_message);
        }
    });

    if state.show_summary {
        show_summary_panel(ctx, &grid);
    }

    egui::CentralPanel::default().show(ctx, |ui| {
        show_grid_table(ui, &mut state, &grid, &mut writers);
    });
}
