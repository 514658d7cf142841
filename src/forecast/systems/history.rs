// src/forecast/systems/history.rs
use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksRuntime;

use super::fetch::client_unavailable;
use crate::forecast::events::{MaterialHistoryLoaded, RequestMaterialHistory};
use crate::forecast::resources::{ActiveGrid, ApiHandle, MaterialHistoryState};

pub fn handle_history_request(
    mut events: EventReader<RequestMaterialHistory>,
    grid: Res<ActiveGrid>,
    api: Res<ApiHandle>,
    runtime: Res<TokioTasksRuntime>,
    mut state: ResMut<MaterialHistoryState>,
) {
    let Some(event) = events.read().last() else {
        return;
    };
    let material = event.material.trim().to_string();
    *state = MaterialHistoryState {
        open: true,
        material: material.clone(),
        loading: true,
        ..default()
    };
    let Some(selection) = grid.selection().cloned() else {
        state.loading = false;
        state.error = Some("No period selected.".to_string());
        return;
    };
    let Some(client) = api.api.clone() else {
        state.loading = false;
        state.error = Some(client_unavailable(&api).to_string());
        return;
    };
    debug!("Forecast: loading history for {}", material);
    runtime.spawn_background_task(move |mut ctx| async move {
        let result = client.fetch_history(&material, &selection).await;
        ctx.run_on_main_thread(move |ctx| {
            ctx.world.send_event(MaterialHistoryLoaded { material, result });
        })
        .await;
    });
}

/// Responses for a material other than the one on screen are ignored.
pub fn handle_history_loaded(
    mut events: EventReader<MaterialHistoryLoaded>,
    mut state: ResMut<MaterialHistoryState>,
) {
    for event in events.read() {
        if event.material != state.material {
            continue;
        }
        state.loading = false;
        match &event.result {
            Ok(rows) => {
                state.rows = rows.clone();
                state.error = None;
            }
            Err(e) => {
                warn!("Forecast: history for {} failed: {}", event.material, e);
                state.rows.clear();
                state.error = Some(e.to_string());
            }
        }
    }
}
