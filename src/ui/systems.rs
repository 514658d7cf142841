// src/ui/systems.rs
use bevy::prelude::*;

use crate::forecast::events::{ForecastOperationFeedback, PostBlockedAlert};
use crate::ui::{state::DeskUiState, UiFeedbackState};

pub fn handle_ui_feedback(
    mut feedback_events: EventReader<ForecastOperationFeedback>,
    mut ui_feedback_state: ResMut<UiFeedbackState>,
) {
    let mut last_message: Option<(String, bool)> = None;
    for event in feedback_events.read() {
        // An error stays visible over later successes in the same frame.
        if last_message.as_ref().is_some_and(|(_, is_error)| *is_error) {
            continue;
        }
        last_message = Some((event.message.clone(), event.is_error));
    }
    if let Some((msg, is_error)) = last_message {
        ui_feedback_state.last_message = msg;
        ui_feedback_state.is_error = is_error;
        if is_error {
            warn!("UI Feedback (Error): {}", ui_feedback_state.last_message);
        } else {
            info!("UI Feedback: {}", ui_feedback_state.last_message);
        }
    }
}

pub fn handle_post_blocked_alerts(
    mut alerts: EventReader<PostBlockedAlert>,
    mut state: ResMut<DeskUiState>,
) {
    if let Some(alert) = alerts.read().last() {
        state.alert_message = Some(alert.message.clone());
    }
}
