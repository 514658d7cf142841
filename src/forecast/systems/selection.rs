// src/forecast/systems/selection.rs
use bevy::prelude::*;

use crate::forecast::api::AuthContext;
use crate::forecast::engine::ForecastGrid;
use crate::forecast::events::{
    ForecastOperationFeedback, RequestChangeSelection, RequestReconnectApi, RequestRefresh,
    RequestSelectUnit,
};
use crate::forecast::resources::{ActiveGrid, ApiHandle, MaterialHistoryState};
use crate::settings::AppSettings;

/// Unit switch: the old grid is torn down (pending autosave dropped) and a
/// fresh one starts on the same period.
pub fn handle_select_unit(
    mut events: EventReader<RequestSelectUnit>,
    mut grid: ResMut<ActiveGrid>,
    mut history: ResMut<MaterialHistoryState>,
    settings: Res<AppSettings>,
    time: Res<Time>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    if event.unit == grid.unit() {
        return;
    }
    let previous_selection = grid.selection().cloned();
    grid.teardown();
    info!("Forecast: switching unit {} -> {}", grid.unit(), event.unit);
    let next = ForecastGrid::succeeding(
        &grid,
        event.unit,
        settings.policy_for(event.unit),
        settings.timings(),
        settings.invalid_numbers,
    );
    grid.0 = next;
    *history = MaterialHistoryState::default();
    if let Some(selection) = previous_selection {
        grid.set_selection(selection, time.elapsed());
    }
}

pub fn handle_selection_change(
    mut events: EventReader<RequestChangeSelection>,
    mut grid: ResMut<ActiveGrid>,
    time: Res<Time>,
) {
    for event in events.read() {
        grid.set_selection(event.selection.clone(), time.elapsed());
    }
}

pub fn handle_refresh_request(
    mut events: EventReader<RequestRefresh>,
    mut grid: ResMut<ActiveGrid>,
    mut feedback: EventWriter<ForecastOperationFeedback>,
    time: Res<Time>,
) {
    if events.read().last().is_none() {
        return;
    }
    if let Err(e) = grid.refresh(time.elapsed()) {
        feedback.write(ForecastOperationFeedback {
            message: e.to_string(),
            is_error: true,
        });
    }
}

pub fn handle_reconnect_request(
    mut events: EventReader<RequestReconnectApi>,
    settings: Res<AppSettings>,
    mut api: ResMut<ApiHandle>,
    mut feedback: EventWriter<ForecastOperationFeedback>,
) {
    if events.read().last().is_none() {
        return;
    }
    *api = ApiHandle::connect(&settings, &AuthContext::load());
    let (message, is_error) = match &api.last_error {
        Some(e) => (format!("API client error: {}", e), true),
        None => (format!("Connected ({}).", api.auth_status), false),
    };
    feedback.write(ForecastOperationFeedback { message, is_error });
}
