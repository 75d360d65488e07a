use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::errors::AppError;
use crate::services::calendar::generate_ics;
use crate::state::AppState;

pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    // Strip .ics suffix if present
    let appointment_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    let (appointment, slot) = state.coordinator.scheduler().appointment(appointment_id)?;
    let ics = generate_ics(&appointment, &slot, &state.config.clinic_name)?;
    let filename = format!("appointment-{appointment_id}.ics");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response())
}
