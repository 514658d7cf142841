// src/forecast/systems/save.rs
use bevy::prelude::*;
use bevy_tokio_tasks::TokioTasksRuntime;

use super::fetch::client_unavailable;
use crate::forecast::api::ForecastApi;
use crate::forecast::engine::{GridError, PostRequest, SaveRequest, SaveTrigger};
use crate::forecast::events::{
    ForecastOperationFeedback, ForecastPostCompleted, ForecastSaveCompleted, PostBlockedAlert,
    RequestPostForecast, RequestSaveForecast,
};
use crate::forecast::resources::{ActiveGrid, ApiHandle};

fn spawn_save(runtime: &TokioTasksRuntime, client: ForecastApi, request: SaveRequest) {
    runtime.spawn_background_task(move |mut ctx| async move {
        let result = client
            .save_changes(request.unit, &request.selection, &request.records)
            .await;
        ctx.run_on_main_thread(move |ctx| {
            ctx.world.send_event(ForecastSaveCompleted {
                generation: request.generation,
                trigger: request.trigger,
                overlay_revision: request.overlay_revision,
                record_count: request.records.len(),
                result,
            });
        })
        .await;
    });
}

fn spawn_post(runtime: &TokioTasksRuntime, client: ForecastApi, request: PostRequest) {
    runtime.spawn_background_task(move |mut ctx| async move {
        let result = client
            .post_forecast(request.unit, &request.selection, &request.rows, &request.records)
            .await;
        ctx.run_on_main_thread(move |ctx| {
            ctx.world.send_event(ForecastPostCompleted {
                generation: request.generation,
                result,
            });
        })
        .await;
    });
}

/// Fires the debounced autosave when due.
pub fn dispatch_autosave(
    mut grid: ResMut<ActiveGrid>,
    api: Res<ApiHandle>,
    runtime: Res<TokioTasksRuntime>,
    time: Res<Time>,
    mut completed: EventWriter<ForecastSaveCompleted>,
) {
    let Some(request) = grid.poll_autosave(time.elapsed()) else {
        return;
    };
    debug!("Forecast: autosaving {} record(s).", request.records.len());
    match api.api.clone() {
        Some(client) => spawn_save(&runtime, client, request),
        None => {
            completed.write(ForecastSaveCompleted {
                generation: request.generation,
                trigger: request.trigger,
                overlay_revision: request.overlay_revision,
                record_count: request.records.len(),
                result: Err(client_unavailable(&api)),
            });
        }
    }
}

pub fn handle_save_request(
    mut events: EventReader<RequestSaveForecast>,
    mut grid: ResMut<ActiveGrid>,
    api: Res<ApiHandle>,
    runtime: Res<TokioTasksRuntime>,
    mut feedback: EventWriter<ForecastOperationFeedback>,
    mut completed: EventWriter<ForecastSaveCompleted>,
) {
    if events.read().last().is_none() {
        return;
    }
    let request = match grid.request_save() {
        Ok(request) => request,
        Err(e) => {
            feedback.write(ForecastOperationFeedback {
                message: e.to_string(),
                is_error: true,
            });
            return;
        }
    };
    info!("Forecast: saving {} record(s).", request.records.len());
    match api.api.clone() {
        Some(client) => spawn_save(&runtime, client, request),
        None => {
            completed.write(ForecastSaveCompleted {
                generation: request.generation,
                trigger: request.trigger,
                overlay_revision: request.overlay_revision,
                record_count: request.records.len(),
                result: Err(client_unavailable(&api)),
            });
        }
    }
}

pub fn handle_post_request(
    mut events: EventReader<RequestPostForecast>,
    mut grid: ResMut<ActiveGrid>,
    api: Res<ApiHandle>,
    runtime: Res<TokioTasksRuntime>,
    mut feedback: EventWriter<ForecastOperationFeedback>,
    mut alerts: EventWriter<PostBlockedAlert>,
    mut completed: EventWriter<ForecastPostCompleted>,
) {
    if events.read().last().is_none() {
        return;
    }
    let request = match grid.request_post() {
        Ok(request) => request,
        Err(e @ GridError::PostNotEligible(_)) | Err(e @ GridError::InvalidCells(_)) => {
            warn!("Forecast: post blocked: {}", e);
            alerts.write(PostBlockedAlert {
                message: e.to_string(),
            });
            return;
        }
        Err(e) => {
            feedback.write(ForecastOperationFeedback {
                message: e.to_string(),
                is_error: true,
            });
            return;
        }
    };
    info!(
        "Forecast: posting {} row(s) with {} change record(s).",
        request.rows.len(),
        request.records.len()
    );
    match api.api.clone() {
        Some(client) => spawn_post(&runtime, client, request),
        None => {
            completed.write(ForecastPostCompleted {
                generation: request.generation,
                result: Err(client_unavailable(&api)),
            });
        }
    }
}

pub fn handle_save_completed(
    mut events: EventReader<ForecastSaveCompleted>,
    mut grid: ResMut<ActiveGrid>,
    mut feedback: EventWriter<ForecastOperationFeedback>,
    time: Res<Time>,
) {
    let now = time.elapsed();
    for event in events.read() {
        let result = event.result.clone().map_err(|e| e.to_string());
        match event.trigger {
            SaveTrigger::Autosave => {
                grid.autosave_completed(event.generation, event.overlay_revision, result, now)
            }
            SaveTrigger::Manual => grid.save_completed(event.generation, result, now),
        }
        let label = match event.trigger {
            SaveTrigger::Autosave => "Autosaved",
            SaveTrigger::Manual => "Saved",
        };
        let (message, is_error) = match &event.result {
            Ok(()) => (format!("{} {} record(s).", label, event.record_count), false),
            Err(e) => (format!("Save failed: {}", e), true),
        };
        feedback.write(ForecastOperationFeedback { message, is_error });
    }
}

pub fn handle_post_completed(
    mut events: EventReader<ForecastPostCompleted>,
    mut grid: ResMut<ActiveGrid>,
    mut feedback: EventWriter<ForecastOperationFeedback>,
    time: Res<Time>,
) {
    let now = time.elapsed();
    for event in events.read() {
        grid.post_completed(
            event.generation,
            event.result.clone().map_err(|e| e.to_string()),
            now,
        );
        let (message, is_error) = match &event.result {
            Ok(()) => ("Forecast posted.".to_string(), false),
            Err(e) => (format!("Post failed: {}", e), true),
        };
        feedback.write(ForecastOperationFeedback { message, is_error });
    }
}
