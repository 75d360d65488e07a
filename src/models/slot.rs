use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::intent::{Department, TimeOfDay};

const DEFAULT_CATALOG: &str = include_str!("../../data/clinic_slots.json");

/// One bookable appointment opportunity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Slot {
    pub slot_id: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub department: Department,
    pub date: NaiveDate,
    /// Wall-clock start, `HH:MM`.
    pub time: String,
    pub time_of_day: TimeOfDay,
    pub location: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
    #[serde(default)]
    pub booked: bool,
}

fn default_duration() -> i32 {
    30
}

impl Slot {
    pub fn start_time(&self) -> anyhow::Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M")
            .map_err(|_| anyhow::anyhow!("invalid slot time: {}", self.time))
    }

    /// Coarse identity used by the per-user calendar. Times compare as clock
    /// values, so `9:00` and `09:00` are the same start.
    pub fn same_start(&self, date: NaiveDate, time: &str) -> bool {
        if self.date != date {
            return false;
        }
        match (self.start_time(), NaiveTime::parse_from_str(time, "%H:%M")) {
            (Ok(a), Ok(b)) => a == b,
            _ => self.time == time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotCatalog {
    pub slots: Vec<Slot>,
}

impl SlotCatalog {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let mut catalog: SlotCatalog = serde_json::from_str(s)?;
        for slot in &mut catalog.slots {
            slot.time = slot.start_time()?.format("%H:%M").to_string();
        }

        let mut seen = std::collections::HashSet::new();
        for slot in &catalog.slots {
            if !seen.insert(slot.slot_id.as_str()) {
                return Err(anyhow::anyhow!("duplicate slot id: {}", slot.slot_id));
            }
            if slot.time_of_day == TimeOfDay::Any {
                return Err(anyhow::anyhow!(
                    "slot {} needs a concrete time of day",
                    slot.slot_id
                ));
            }
            if slot.duration_minutes <= 0 {
                return Err(anyhow::anyhow!(
                    "slot {} has a non-positive duration",
                    slot.slot_id
                ));
            }
        }
        Ok(catalog)
    }

    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read slot catalogue: {p}"))?;
                Self::from_json(&raw)
            }
            None => Self::from_json(DEFAULT_CATALOG),
        }
    }

    pub fn builtin() -> anyhow::Result<Self> {
        Self::load(None)
    }
}
