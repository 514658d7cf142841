// src/forecast/resources.rs
use bevy::prelude::*;

use super::api::{AuthContext, ForecastApi};
use super::definitions::ForecastRow;
use super::engine::ForecastGrid;
use crate::settings::AppSettings;

/// The grid session of the screen currently shown.
#[derive(Resource, Debug, Deref, DerefMut)]
pub struct ActiveGrid(pub ForecastGrid);

impl ActiveGrid {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let unit = settings.default_unit;
        Self(ForecastGrid::new(
            unit,
            settings.policy_for(unit),
            settings.timings(),
            settings.invalid_numbers,
        ))
    }
}

/// API client built from settings and the injected credentials. `None` when
/// the client could not be constructed.
#[derive(Resource, Debug, Default)]
pub struct ApiHandle {
    pub api: Option<ForecastApi>,
    pub auth_status: &'static str,
    pub last_error: Option<String>,
}

impl ApiHandle {
    pub fn connect(settings: &AppSettings, auth: &AuthContext) -> Self {
        let base_url = settings.resolved_base_url();
        match ForecastApi::new(&base_url, settings.request_timeout(), auth) {
            Ok(api) => {
                info!("Forecast API: using {} ({}).", api.base_url(), auth.status_label());
                Self {
                    api: Some(api),
                    auth_status: auth.status_label(),
                    last_error: None,
                }
            }
            Err(e) => {
                error!("Forecast API: could not create client for {}: {}", base_url, e);
                Self {
                    api: None,
                    auth_status: auth.status_label(),
                    last_error: Some(e.to_string()),
                }
            }
        }
    }
}

/// State of the material history window.
#[derive(Resource, Debug, Default, Clone)]
pub struct MaterialHistoryState {
    pub open: bool,
    pub material: String,
    pub loading: bool,
    pub rows: Vec<ForecastRow>,
    pub error: Option<String>,
}
