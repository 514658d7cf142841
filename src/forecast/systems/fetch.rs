// src/forecast/systems/fetch.rs
use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksRuntime;

use crate::forecast::api::ApiError;
use crate::forecast::events::{ForecastFetchCompleted, ForecastOperationFeedback};
use crate::forecast::resources::{ActiveGrid, ApiHandle};

pub(crate) fn client_unavailable(api: &ApiHandle) -> ApiError {
    ApiError::Client(
        api.last_error
            .clone()
            .unwrap_or_else(|| "API client is not configured".to_string()),
    )
}

/// Issues the debounced refresh once it is due.
pub fn dispatch_fetch_requests(
    mut grid: ResMut<ActiveGrid>,
    api: Res<ApiHandle>,
    runtime: Res<TokioTasksRuntime>,
    time: Res<Time>,
    mut completed: EventWriter<ForecastFetchCompleted>,
) {
    let Some(request) = grid.poll_fetch(time.elapsed()) else {
        return;
    };
    let Some(client) = api.api.clone() else {
        completed.write(ForecastFetchCompleted {
            generation: request.generation,
            result: Err(client_unavailable(&api)),
        });
        return;
    };
    info!(
        "Forecast: fetching {} rows for {:?} (generation {}).",
        request.unit, request.selection, request.generation
    );
    runtime.spawn_background_task(move |mut ctx| async move {
        let result = client.fetch_snapshot(request.unit, &request.selection).await;
        ctx.run_on_main_thread(move |ctx| {
            ctx.world.send_event(ForecastFetchCompleted {
                generation: request.generation,
                result,
            });
        })
        .await;
    });
}

pub fn handle_fetch_completed(
    mut events: EventReader<ForecastFetchCompleted>,
    mut grid: ResMut<ActiveGrid>,
    mut feedback: EventWriter<ForecastOperationFeedback>,
) {
    for event in events.read() {
        let result = event.result.clone().map_err(|e| e.to_string());
        if !grid.apply_fetch(event.generation, result) {
            continue;
        }
        let (message, is_error) = match &event.result {
            Ok(snapshot) => (
                format!("Loaded {} row(s) for {}.", snapshot.rows.len(), grid.unit()),
                false,
            ),
            Err(e) => (format!("Failed to load forecast rows: {}", e), true),
        };
        feedback.write(ForecastOperationFeedback { message, is_error });
    }
}
