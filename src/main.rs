// src/main.rs

#![cfg_attr(all(not(debug_assertions), target_os = "windows"), windows_subsystem = "windows")]

use bevy::{
    log::LogPlugin,
    prelude::*,
    window::WindowPlugin,
    winit::{UpdateMode, WinitSettings},
};
use clap::Parser;
use std::time::Duration;

use bevy_egui::EguiPlugin;
use bevy_tokio_tasks::TokioTasksPlugin;

mod cli;
mod forecast;
mod settings;
mod ui;

use forecast::ForecastPlugin;
use ui::DeskUiPlugin;

fn main() {
    // `.env` is optional; real environment variables win.
    let _ = dotenvy::dotenv();

    let args = cli::Cli::parse();
    if let Some(command) = args.command {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                eprintln!("Failed to start async runtime: {}", e);
                std::process::exit(1);
            }
        };
        if let Err(e) = runtime.block_on(cli::run(command)) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    App::new()
        .insert_resource(WinitSettings {
            focused_mode: UpdateMode::Continuous,
            // Keeps autosave and fetch debounces ticking while unfocused.
            unfocused_mode: UpdateMode::reactive_low_power(Duration::from_secs_f32(1.0 / 5.0)),
        })
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Forecast Desk".into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    level: bevy::log::Level::INFO,
                    filter: "wgpu=error,naga=warn,bevy_tokio_tasks=warn,reqwest=warn,hyper=warn".to_string(),
                    ..default()
                }),
        )
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: true,
        })
        .add_plugins(TokioTasksPlugin::default())
        .add_plugins(ForecastPlugin)
        .add_plugins(DeskUiPlugin)
        .run();
}
