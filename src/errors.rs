use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::availability::SchedulingError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SchedulingError> for AppError {
    fn from(e: SchedulingError) -> Self {
        match e {
            SchedulingError::AppointmentNotFound(id) => {
                AppError::NotFound(format!("appointment {id}"))
            }
            SchedulingError::SlotNotFound(id) => AppError::NotFound(format!("slot {id}")),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
