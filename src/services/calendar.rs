use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::models::{Appointment, AppointmentStatus, CalendarEntry, Slot};

/// How calendar updates and removals identify the entry they act on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalendarMode {
    /// Entries are keyed by appointment id.
    #[default]
    ByAppointment,
    /// Update replaces by matching date/time; remove clears every entry the
    /// user holds.
    Legacy,
}

impl CalendarMode {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "legacy" => CalendarMode::Legacy,
            _ => CalendarMode::ByAppointment,
        }
    }
}

/// Per-user calendars used to keep a patient from holding two appointments
/// at the same date and time.
#[derive(Debug, Default)]
pub struct Calendar {
    mode: CalendarMode,
    entries: HashMap<String, Vec<CalendarEntry>>,
}

impl Calendar {
    pub fn new(mode: CalendarMode) -> Self {
        Self {
            mode,
            entries: HashMap::new(),
        }
    }

    /// Same date and same start time counts as a conflict. No duration overlap.
    pub fn has_conflict(&self, user_id: &str, slot: &Slot) -> bool {
        self.entries
            .get(user_id)
            .map(|entries| entries.iter().any(|e| e.overlaps(slot)))
            .unwrap_or(false)
    }

    pub fn add(&mut self, user_id: &str, appointment_id: &str, slot: &Slot) {
        self.entries
            .entry(user_id.to_string())
            .or_default()
            .push(CalendarEntry::for_slot(appointment_id, slot));
    }

    pub fn update(&mut self, user_id: &str, appointment_id: &str, slot: &Slot) {
        let entries = self.entries.entry(user_id.to_string()).or_default();
        match self.mode {
            CalendarMode::ByAppointment => {
                entries.retain(|e| e.appointment_id != appointment_id);
            }
            CalendarMode::Legacy => {
                entries.retain(|e| !e.overlaps(slot));
            }
        }
        entries.push(CalendarEntry::for_slot(appointment_id, slot));
    }

    pub fn remove(&mut self, user_id: &str, appointment_id: &str) {
        match self.mode {
            CalendarMode::ByAppointment => {
                if let Some(entries) = self.entries.get_mut(user_id) {
                    entries.retain(|e| e.appointment_id != appointment_id);
                    if entries.is_empty() {
                        self.entries.remove(user_id);
                    }
                }
            }
            CalendarMode::Legacy => {
                self.entries.remove(user_id);
            }
        }
    }

    pub fn entries(&self, user_id: &str) -> &[CalendarEntry] {
        self.entries
            .get(user_id)
            .map(|e| e.as_slice())
            .unwrap_or(&[])
    }
}

pub fn generate_ics(
    appointment: &Appointment,
    slot: &Slot,
    clinic_name: &str,
) -> anyhow::Result<String> {
    let start = slot.date.and_time(slot.start_time()?);
    let end = start + Duration::minutes(slot.duration_minutes as i64);

    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = end.format("%Y%m%dT%H%M%S").to_string();
    let dtstamp = appointment.updated_at.format("%Y%m%dT%H%M%S").to_string();
    let uid = format!("{}@careflow", appointment.id);
    let status = match appointment.status {
        AppointmentStatus::Booked => "CONFIRMED",
        AppointmentStatus::Canceled => "CANCELLED",
    };

    let summary = format!("{} appointment with {}", slot.department, slot.doctor_name);
    let location = format!("{} ({clinic_name})", slot.location);

    Ok(format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//CareFlow//Appointment Assistant//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         LOCATION:{location}\r\n\
         STATUS:{status}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::{Department, TimeOfDay};

    fn slot(id: &str, date: &str, time: &str) -> Slot {
        Slot {
            slot_id: id.to_string(),
            doctor_id: "doc-1".to_string(),
            doctor_name: "Dr. Mehta".to_string(),
            department: Department::Cardiology,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: time.to_string(),
            time_of_day: TimeOfDay::Evening,
            location: "Sunrise Clinic".to_string(),
            duration_minutes: 45,
            booked: false,
        }
    }

    #[test]
    fn test_conflict_is_exact_date_and_time() {
        let mut calendar = Calendar::new(CalendarMode::ByAppointment);
        calendar.add("alice", "appt-1", &slot("a", "2025-12-05", "18:30"));

        assert!(calendar.has_conflict("alice", &slot("b", "2025-12-05", "18:30")));
        assert!(!calendar.has_conflict("alice", &slot("c", "2025-12-05", "18:45")));
        assert!(!calendar.has_conflict("alice", &slot("d", "2025-12-06", "18:30")));
        assert!(!calendar.has_conflict("bob", &slot("b", "2025-12-05", "18:30")));
    }

    #[test]
    fn test_update_by_appointment_replaces_entry() {
        let mut calendar = Calendar::new(CalendarMode::ByAppointment);
        calendar.add("alice", "appt-1", &slot("a", "2025-12-05", "18:30"));
        calendar.update("alice", "appt-1", &slot("b", "2025-12-05", "10:00"));

        let entries = calendar.entries("alice");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].time, "10:00");
    }

    #[test]
    fn test_legacy_update_keeps_old_entry() {
        let mut calendar = Calendar::new(CalendarMode::Legacy);
        calendar.add("alice", "appt-1", &slot("a", "2025-12-05", "18:30"));
        calendar.update("alice", "appt-1", &slot("b", "2025-12-05", "10:00"));

        // Only an entry at the new date/time would have been replaced.
        assert_eq!(calendar.entries("alice").len(), 2);
    }

    #[test]
    fn test_remove_by_appointment_keeps_others() {
        let mut calendar = Calendar::new(CalendarMode::ByAppointment);
        calendar.add("alice", "appt-1", &slot("a", "2025-12-05", "18:30"));
        calendar.add("alice", "appt-2", &slot("b", "2025-12-06", "15:00"));
        calendar.remove("alice", "appt-1");

        let entries = calendar.entries("alice");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].appointment_id, "appt-2");
    }

    #[test]
    fn test_removing_last_entry_drops_user() {
        let mut calendar = Calendar::new(CalendarMode::ByAppointment);
        calendar.add("alice", "appt-1", &slot("a", "2025-12-05", "18:30"));
        calendar.remove("alice", "appt-1");

        assert!(calendar.entries("alice").is_empty());
        assert!(!calendar.entries.contains_key("alice"));
    }

    #[test]
    fn test_conflict_ignores_zero_padding() {
        let mut calendar = Calendar::new(CalendarMode::ByAppointment);
        calendar.add("alice", "appt-1", &slot("a", "2025-12-05", "09:00"));

        assert!(calendar.has_conflict("alice", &slot("b", "2025-12-05", "9:00")));
    }

    #[test]
    fn test_legacy_remove_clears_user() {
        let mut calendar = Calendar::new(CalendarMode::Legacy);
        calendar.add("alice", "appt-1", &slot("a", "2025-12-05", "18:30"));
        calendar.add("alice", "appt-2", &slot("b", "2025-12-06", "15:00"));
        calendar.add("bob", "appt-3", &slot("c", "2025-12-06", "15:00"));
        calendar.remove("alice", "appt-1");

        assert!(calendar.entries("alice").is_empty());
        assert_eq!(calendar.entries("bob").len(), 1);
    }

    #[test]
    fn test_calendar_mode_parse() {
        assert_eq!(CalendarMode::parse("legacy"), CalendarMode::Legacy);
        assert_eq!(CalendarMode::parse("by_appointment"), CalendarMode::ByAppointment);
        assert_eq!(CalendarMode::parse(""), CalendarMode::ByAppointment);
    }

    #[test]
    fn test_generate_ics() {
        let mut appointment = Appointment::new("alice", "a");
        appointment.id = "test-123".to_string();
        appointment.updated_at =
            chrono::NaiveDateTime::parse_from_str("2025-11-20 09:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap();

        let ics = generate_ics(&appointment, &slot("a", "2025-12-05", "18:30"), "CareFlow").unwrap();
        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("UID:test-123@careflow"));
        assert!(ics.contains("DTSTAMP:20251120T090000"));
        assert!(ics.contains("DTSTART:20251205T183000"));
        assert!(ics.contains("DTEND:20251205T191500"));
        assert!(ics.contains("SUMMARY:Cardiology appointment with Dr. Mehta"));
        assert!(ics.contains("LOCATION:Sunrise Clinic (CareFlow)"));
        assert!(ics.contains("STATUS:CONFIRMED"));
        assert!(ics.contains("END:VCALENDAR"));
    }

    #[test]
    fn test_generate_ics_canceled() {
        let mut appointment = Appointment::new("alice", "a");
        appointment.status = AppointmentStatus::Canceled;
        let ics = generate_ics(&appointment, &slot("a", "2025-12-05", "18:30"), "CareFlow").unwrap();
        assert!(ics.contains("STATUS:CANCELLED"));
    }
}
