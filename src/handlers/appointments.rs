use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Appointment, Department, RequestAttributes, Slot, TimeOfDay};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SlotQuery {
    pub department: Option<String>,
    pub time_of_day: Option<String>,
}

pub async fn list_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<Vec<Slot>>, AppError> {
    let department = match query.department.as_deref() {
        Some(d) => Department::from_name(d)
            .ok_or_else(|| AppError::BadRequest(format!("unknown department: {d}")))?,
        None => Department::General,
    };
    let time_of_day = match query.time_of_day.as_deref() {
        Some(t) => TimeOfDay::from_name(t)
            .ok_or_else(|| AppError::BadRequest(format!("unknown time of day: {t}")))?,
        None => TimeOfDay::Any,
    };

    let request = RequestAttributes {
        department,
        time_of_day,
    };
    let slots = state.coordinator.scheduler().find_available_slots(&request)?;
    Ok(Json(slots))
}

#[derive(Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub slot: Slot,
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentView>, AppError> {
    let (appointment, slot) = state.coordinator.scheduler().appointment(&id)?;
    Ok(Json(AppointmentView { appointment, slot }))
}
