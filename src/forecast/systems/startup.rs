// src/forecast/systems/startup.rs
use bevy::prelude::*;

use crate::forecast::api::AuthContext;
use crate::forecast::definitions::Selection;
use crate::forecast::resources::{ActiveGrid, ApiHandle};
use crate::settings::{io::load_settings_from_file, AppSettings};

/// Loads settings and credentials and opens the grid on the current month.
pub fn initialize_forecast_session(mut commands: Commands, time: Res<Time>) {
    let settings: AppSettings = match load_settings_from_file() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Forecast: failed to load settings, using defaults: {}", e);
            AppSettings::default()
        }
    };
    let auth = AuthContext::load();
    let api = ApiHandle::connect(&settings, &auth);
    let mut grid = ActiveGrid::from_settings(&settings);
    let today = chrono::Local::now().date_naive();
    grid.set_selection(Selection::for_date(today), time.elapsed());
    info!(
        "Forecast: session ready for {} ({}).",
        grid.unit(),
        if grid.phase() == crate::forecast::engine::GridPhase::Idle {
            "waiting for selection"
        } else {
            "loading"
        }
    );
    commands.insert_resource(settings);
    commands.insert_resource(api);
    commands.insert_resource(grid);
}
