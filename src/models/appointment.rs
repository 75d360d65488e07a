use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub user_id: String,
    pub slot_id: String,
    pub status: AppointmentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "canceled" => AppointmentStatus::Canceled,
            _ => AppointmentStatus::Booked,
        }
    }
}

impl Appointment {
    pub fn new(user_id: &str, slot_id: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            slot_id: slot_id.to_string(),
            status: AppointmentStatus::Booked,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AppointmentStatus::Booked
    }
}
