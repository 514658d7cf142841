// src/cli/mod.rs
// Command-line tools sharing the editor's grid engine and API client.

pub mod history;
pub mod push;
pub mod rows;
pub mod token;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::forecast::api::{ApiError, AuthContext, AuthError, ForecastApi};
use crate::forecast::definitions::{OrgUnit, Selection};
use crate::forecast::engine::{ForecastGrid, GridError};
use crate::settings::{io::load_settings_from_file, AppSettings};

#[derive(Parser)]
#[command(name = "forecast_desk")]
#[command(about = "Forecast Desk - monthly forecast grid editor with command-line tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store the API bearer token in the OS keyring
    SetToken {
        token: String,
    },

    /// Remove the stored API token
    ClearToken,

    /// Fetch and print the forecast rows of a period
    Rows {
        #[arg(long, value_enum)]
        unit: OrgUnit,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
        /// Required for the branch unit
        #[arg(long)]
        branch: Option<String>,
    },

    /// Print the historical values of one material
    History {
        #[arg(long)]
        material: String,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
    },

    /// Apply edits from a JSON file ({ rowKey: { column: value } }) and save them
    Push {
        #[arg(long, value_enum)]
        unit: OrgUnit,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        branch: Option<String>,
        /// Path to the overlay JSON file
        #[arg(long)]
        overlay: PathBuf,
        /// Finalize the period instead of only saving
        #[arg(long)]
        post: bool,
    },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Settings: {0}")]
    Settings(#[from] std::io::Error),
    #[error("Overlay file: {0}")]
    Overlay(String),
}

pub async fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::SetToken { token } => token::set_token(&token),
        Commands::ClearToken => token::clear_token(),
        Commands::Rows {
            unit,
            month,
            year,
            branch,
        } => rows::print_rows(unit, Selection::new(branch, month, year)).await,
        Commands::History {
            material,
            branch,
            month,
            year,
        } => history::print_history(&material, Selection::new(branch, month, year)).await,
        Commands::Push {
            unit,
            month,
            year,
            branch,
            overlay,
            post,
        } => push::push_overlay(unit, Selection::new(branch, month, year), &overlay, post).await,
    }
}

/// Settings, credentials and client as the editor would build them.
pub(crate) fn connect() -> Result<(AppSettings, ForecastApi), CliError> {
    let settings: AppSettings = load_settings_from_file()?;
    let auth = AuthContext::load();
    let api = ForecastApi::new(&settings.resolved_base_url(), settings.request_timeout(), &auth)?;
    println!("Backend: {} ({})", api.base_url(), auth.status_label());
    Ok((settings, api))
}

/// Runs one refresh through a fresh grid so the CLI sees exactly the editor's
/// state. Returns the grid and the instant used as "now".
pub(crate) async fn load_grid(
    settings: &AppSettings,
    api: &ForecastApi,
    unit: OrgUnit,
    selection: Selection,
) -> Result<(ForecastGrid, Duration), CliError> {
    let timings = settings.timings();
    let mut grid = ForecastGrid::new(unit, settings.policy_for(unit), timings, settings.invalid_numbers);
    grid.set_selection(selection, Duration::ZERO);
    let now = timings.fetch_debounce;
    let request = grid.poll_fetch(now).ok_or(GridError::NoSelection)?;
    let snapshot = api.fetch_snapshot(request.unit, &request.selection).await?;
    grid.apply_fetch(request.generation, Ok(snapshot));
    Ok((grid, now))
}
