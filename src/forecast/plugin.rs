// src/forecast/plugin.rs
use bevy::prelude::*;

use super::events::{
    CellCommitEvent, CellEditedEvent, ForecastFetchCompleted, ForecastOperationFeedback,
    ForecastPostCompleted, ForecastSaveCompleted, MaterialHistoryLoaded, PostBlockedAlert,
    RequestChangeSelection, RequestMaterialHistory, RequestPostForecast, RequestReconnectApi,
    RequestRefresh, RequestSaveForecast, RequestSelectUnit,
};
use super::resources::MaterialHistoryState;
use super::systems;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForecastSystemSet {
    /// Selection, edits and button requests from the UI.
    UserInput,
    /// Results coming back from background tasks.
    ApplyResults,
    /// Debounced fetches, autosaves and other outgoing requests.
    Dispatch,
}

/// Grid sessions, the backend client and the async request plumbing.
pub struct ForecastPlugin;

impl Plugin for ForecastPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                ForecastSystemSet::UserInput,
                ForecastSystemSet::ApplyResults.after(ForecastSystemSet::UserInput),
                ForecastSystemSet::Dispatch.after(ForecastSystemSet::ApplyResults),
            ),
        );

        app.init_resource::<MaterialHistoryState>();

        app.add_event::<RequestSelectUnit>()
            .add_event::<RequestChangeSelection>()
            .add_event::<RequestRefresh>()
            .add_event::<RequestReconnectApi>()
            .add_event::<CellEditedEvent>()
            .add_event::<CellCommitEvent>()
            .add_event::<RequestSaveForecast>()
            .add_event::<RequestPostForecast>()
            .add_event::<RequestMaterialHistory>()
            .add_event::<ForecastFetchCompleted>()
            .add_event::<ForecastSaveCompleted>()
            .add_event::<ForecastPostCompleted>()
            .add_event::<MaterialHistoryLoaded>()
            .add_event::<ForecastOperationFeedback>()
            .add_event::<PostBlockedAlert>();

        app.add_systems(Startup, systems::startup::initialize_forecast_session);

        app.add_systems(
            Update,
            (
                systems::selection::handle_reconnect_request,
                systems::selection::handle_select_unit,
                systems::selection::handle_selection_change,
                systems::selection::handle_refresh_request,
                systems::editing::handle_cell_edits,
                systems::editing::handle_cell_commits,
                systems::save::handle_save_request,
                systems::save::handle_post_request,
                systems::history::handle_history_request,
            )
                .chain()
                .in_set(ForecastSystemSet::UserInput),
        );
        app.add_systems(
            Update,
            (
                systems::fetch::handle_fetch_completed,
                systems::save::handle_save_completed,
                systems::save::handle_post_completed,
                systems::history::handle_history_loaded,
            )
                .chain()
                .in_set(ForecastSystemSet::ApplyResults),
        );
        app.add_systems(
            Update,
            (
                systems::fetch::dispatch_fetch_requests,
                systems::save::dispatch_autosave,
            )
                .chain()
                .in_set(ForecastSystemSet::Dispatch),
        );

        info!("ForecastPlugin initialized.");
    }
}
