use serde::{Deserialize, Serialize};

use super::slot::Slot;

/// Machine-readable reason attached to a failed [`Outcome`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoSlots,
    AllConflict,
    NoPreviousAppointment,
    Backend,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::NoSlots => "no_slots",
            FailureKind::AllConflict => "all_conflict",
            FailureKind::NoPreviousAppointment => "no_previous_appointment",
            FailureKind::Backend => "backend",
        }
    }
}

/// Result of a scheduler operation, handed back to the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    pub appointment_id: Option<String>,
    pub slot: Option<Slot>,
    pub failure: Option<FailureKind>,
}

impl Outcome {
    pub fn succeeded(message: impl Into<String>, appointment_id: String, slot: Option<Slot>) -> Self {
        Self {
            success: true,
            message: message.into(),
            appointment_id: Some(appointment_id),
            slot,
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            appointment_id: None,
            slot: None,
            failure: Some(kind),
        }
    }
}
