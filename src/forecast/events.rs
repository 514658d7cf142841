// src/forecast/events.rs
use bevy::prelude::Event;

use super::api::ApiError;
use super::definitions::{ForecastRow, OrgUnit, Selection};
use super::engine::{GridSnapshot, SaveTrigger};

/// Switch the screen to another unit. Tears the current grid down.
#[derive(Event, Debug, Clone)]
pub struct RequestSelectUnit {
    pub unit: OrgUnit,
}

#[derive(Event, Debug, Clone)]
pub struct RequestChangeSelection {
    pub selection: Selection,
}

#[derive(Event, Debug, Clone)]
pub struct RequestRefresh;

/// Keystroke-level change of a forecast cell.
#[derive(Event, Debug, Clone)]
pub struct CellEditedEvent {
    pub row_key: String,
    pub column: String,
    pub value: String,
}

/// A cell lost focus or the user pressed Enter/Escape.
#[derive(Event, Debug, Clone)]
pub struct CellCommitEvent;

#[derive(Event, Debug, Clone)]
pub struct RequestSaveForecast;

#[derive(Event, Debug, Clone)]
pub struct RequestPostForecast;

#[derive(Event, Debug, Clone)]
pub struct RequestMaterialHistory {
    pub material: String,
}

#[derive(Event, Debug, Clone)]
pub struct ForecastFetchCompleted {
    pub generation: u64,
    pub result: Result<GridSnapshot, ApiError>,
}

#[derive(Event, Debug, Clone)]
pub struct ForecastSaveCompleted {
    pub generation: u64,
    pub trigger: SaveTrigger,
    pub overlay_revision: u64,
    pub record_count: usize,
    pub result: Result<(), ApiError>,
}

#[derive(Event, Debug, Clone)]
pub struct ForecastPostCompleted {
    pub generation: u64,
    pub result: Result<(), ApiError>,
}

#[derive(Event, Debug, Clone)]
pub struct MaterialHistoryLoaded {
    pub material: String,
    pub result: Result<Vec<ForecastRow>, ApiError>,
}

/// User-facing outcome of a forecast operation.
#[derive(Event, Debug, Clone)]
pub struct ForecastOperationFeedback {
    pub message: String,
    pub is_error: bool,
}

/// Blocking message shown when Post is refused locally.
#[derive(Event, Debug, Clone)]
pub struct PostBlockedAlert {
    pub message: String,
}

/// Rebuild the API client after the token or connection settings changed.
#[derive(Event, Debug, Clone)]
pub struct RequestReconnectApi;
