use crate::models::{Intent, Outcome, RequestAttributes};

/// Turns a scheduler outcome into the reply shown to the patient.
///
/// Failures pass their message through unchanged. Missing slot details fall
/// back to neutral wording.
pub fn render(intent: Intent, request: &RequestAttributes, outcome: &Outcome) -> String {
    if !outcome.success {
        return outcome.message.clone();
    }

    let slot = outcome.slot.as_ref();
    let date = slot
        .map(|s| s.date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "an upcoming day".to_string());
    let time = slot
        .map(|s| s.time.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or("a convenient time");
    let doctor = slot
        .map(|s| s.doctor_name.as_str())
        .filter(|d| !d.is_empty())
        .unwrap_or("a specialist");
    let location = slot
        .map(|s| s.location.as_str())
        .filter(|l| !l.is_empty())
        .unwrap_or("the clinic");

    match intent {
        Intent::Book => format!(
            "Your appointment with {doctor} ({}) is booked for {date} at {time} at {location}. \
             If you'd like, I can help you reschedule or cancel later.",
            request.department
        ),
        Intent::Reschedule => format!(
            "Your appointment has been rescheduled to {date} at {time} with {doctor} at {location}."
        ),
        Intent::Cancel => {
            "Your appointment has been canceled. Let me know if you want to book a new one."
                .to_string()
        }
        Intent::Unknown => outcome.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::models::{Department, FailureKind, Slot, TimeOfDay};

    fn slot() -> Slot {
        Slot {
            slot_id: "slot-1".to_string(),
            doctor_id: "doc-1".to_string(),
            doctor_name: "Dr. Mehta".to_string(),
            department: Department::Cardiology,
            date: NaiveDate::from_ymd_opt(2025, 12, 5).unwrap(),
            time: "18:30".to_string(),
            time_of_day: TimeOfDay::Evening,
            location: "Sunrise Clinic".to_string(),
            duration_minutes: 30,
            booked: true,
        }
    }

    fn cardiology() -> RequestAttributes {
        RequestAttributes {
            department: Department::Cardiology,
            time_of_day: TimeOfDay::Evening,
        }
    }

    #[test]
    fn test_book_confirmation() {
        let outcome = Outcome::succeeded("ok", "appt-1".to_string(), Some(slot()));
        let text = render(Intent::Book, &cardiology(), &outcome);
        assert_eq!(
            text,
            "Your appointment with Dr. Mehta (Cardiology) is booked for 2025-12-05 at 18:30 at Sunrise Clinic. \
             If you'd like, I can help you reschedule or cancel later."
        );
    }

    #[test]
    fn test_reschedule_confirmation() {
        let outcome = Outcome::succeeded("ok", "appt-1".to_string(), Some(slot()));
        let text = render(Intent::Reschedule, &RequestAttributes::default(), &outcome);
        assert_eq!(
            text,
            "Your appointment has been rescheduled to 2025-12-05 at 18:30 with Dr. Mehta at Sunrise Clinic."
        );
    }

    #[test]
    fn test_cancel_confirmation() {
        let outcome = Outcome::succeeded("Your appointment has been canceled.", "appt-1".to_string(), None);
        let text = render(Intent::Cancel, &RequestAttributes::default(), &outcome);
        assert_eq!(
            text,
            "Your appointment has been canceled. Let me know if you want to book a new one."
        );
    }

    #[test]
    fn test_defaults_without_slot() {
        let outcome = Outcome::succeeded("ok", "appt-1".to_string(), None);
        let text = render(Intent::Reschedule, &RequestAttributes::default(), &outcome);
        assert_eq!(
            text,
            "Your appointment has been rescheduled to an upcoming day at a convenient time with a specialist at the clinic."
        );
    }

    #[test]
    fn test_blank_fields_use_defaults() {
        let mut s = slot();
        s.doctor_name.clear();
        s.location.clear();
        let outcome = Outcome::succeeded("ok", "appt-1".to_string(), Some(s));
        let text = render(Intent::Book, &RequestAttributes::default(), &outcome);
        assert!(text.starts_with("Your appointment with a specialist (General)"));
        assert!(text.contains("at the clinic."));
    }

    #[test]
    fn test_failure_passes_through() {
        let outcome = Outcome::failed(FailureKind::NoSlots, "No available slots found for ENT in the any.");
        for intent in [Intent::Book, Intent::Reschedule, Intent::Cancel, Intent::Unknown] {
            assert_eq!(
                render(intent, &RequestAttributes::default(), &outcome),
                "No available slots found for ENT in the any."
            );
        }
    }
}
