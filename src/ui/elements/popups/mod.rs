// src/ui/elements/popups/mod.rs
pub mod alert_popup;
pub mod filter_popup;
pub mod history_popup;
pub mod settings_popup;

pub use alert_popup::show_alert_popup;
pub use filter_popup::show_filter_popup;
pub use history_popup::show_history_popup;
pub use settings_popup::show_settings_popup;
