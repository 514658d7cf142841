// src/ui/elements/mod.rs
pub mod grid_table;
pub mod main_view;
pub mod popups;
pub mod summary_panel;
pub mod top_panel;
