// src/forecast/mod.rs
pub mod api;
pub mod definitions;
pub mod engine;
pub mod events;
pub mod plugin;
pub mod resources;
pub mod systems;

pub use plugin::ForecastPlugin;
