// src/forecast/systems/mod.rs
pub mod editing;
pub mod fetch;
pub mod history;
pub mod save;
pub mod selection;
pub mod startup;
