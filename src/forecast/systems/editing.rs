// src/forecast/systems/editing.rs
use bevy::prelude::*;

use crate::forecast::events::{CellCommitEvent, CellEditedEvent, ForecastOperationFeedback};
use crate::forecast::resources::ActiveGrid;

pub fn handle_cell_edits(
    mut events: EventReader<CellEditedEvent>,
    mut grid: ResMut<ActiveGrid>,
    mut feedback: EventWriter<ForecastOperationFeedback>,
    time: Res<Time>,
) {
    let now = time.elapsed();
    for event in events.read() {
        trace!("Forecast: edit {} / {} = '{}'", event.row_key, event.column, event.value);
        if let Err(e) = grid.edit_cell(&event.row_key, &event.column, event.value.clone(), now) {
            warn!("Forecast: edit rejected: {}", e);
            feedback.write(ForecastOperationFeedback {
                message: e.to_string(),
                is_error: true,
            });
        }
    }
}

/// Blur/Enter/Escape flush pending edits right away.
pub fn handle_cell_commits(
    mut events: EventReader<CellCommitEvent>,
    mut grid: ResMut<ActiveGrid>,
    time: Res<Time>,
) {
    if events.read().last().is_some() {
        grid.commit_edits(time.elapsed());
    }
}
