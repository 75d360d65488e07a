use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{FailureKind, Intent};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct IncomingMessage {
    pub user_id: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub reply: String,
    pub intent: Intent,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<IncomingMessage>,
) -> Result<Json<MessageResponse>, AppError> {
    let user_id = payload.user_id.trim();
    let message = payload.message.trim();

    if user_id.is_empty() {
        return Err(AppError::BadRequest("user_id must not be empty".to_string()));
    }

    tracing::info!(user = user_id, body = message, "incoming message");

    let turn = state.coordinator.handle_turn(user_id, message).await;

    let (success, failure, appointment_id) = match &turn.outcome {
        Some(outcome) => (outcome.success, outcome.failure, outcome.appointment_id.clone()),
        None => (false, None, None),
    };

    Ok(Json(MessageResponse {
        reply: turn.reply,
        intent: turn.intent,
        success,
        failure,
        appointment_id,
    }))
}
