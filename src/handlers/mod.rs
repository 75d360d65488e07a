pub mod appointments;
pub mod calendar;
pub mod health;
pub mod message;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/message", post(message::send_message))
        .route("/api/slots", get(appointments::list_slots))
        .route("/api/appointments/:id", get(appointments::get_appointment))
        .route("/calendar/:appointment_id", get(calendar::download_ics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
