use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::slot::Slot;

/// A user's personal record of one appointment, used for conflict checks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEntry {
    pub appointment_id: String,
    pub date: NaiveDate,
    pub time: String,
}

impl CalendarEntry {
    pub fn for_slot(appointment_id: &str, slot: &Slot) -> Self {
        Self {
            appointment_id: appointment_id.to_string(),
            date: slot.date,
            time: slot.time.clone(),
        }
    }

    pub fn overlaps(&self, slot: &Slot) -> bool {
        slot.same_start(self.date, &self.time)
    }
}
