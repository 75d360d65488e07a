use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{
    Appointment, CalendarEntry, FailureKind, Outcome, RequestAttributes, Session, Slot,
};
use crate::services::availability::{AvailabilityResolver, SchedulingError};
use crate::services::calendar::{Calendar, CalendarMode};
use crate::services::store::SlotStore;

struct Inner {
    resolver: AvailabilityResolver,
    calendar: Calendar,
}

/// Sequences booking, rescheduling and cancellation against the resolver and
/// the per-user calendar.
///
/// Selection rule: candidates are considered in store listing order. `book`
/// takes the first candidate that does not clash with the user's calendar;
/// `reschedule` takes the first candidate outright, without a calendar check.
///
/// Every operation runs under a single lock, so concurrent requests cannot
/// interleave between the availability check and the slot claim.
pub struct Scheduler {
    inner: Mutex<Inner>,
}

impl Scheduler {
    pub fn new(store: Box<dyn SlotStore>, calendar_mode: CalendarMode) -> Self {
        Self {
            inner: Mutex::new(Inner {
                resolver: AvailabilityResolver::new(store),
                calendar: Calendar::new(calendar_mode),
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn book(&self, user_id: &str, request: &RequestAttributes) -> Outcome {
        let mut inner = self.inner();
        let department = request.department;
        let time_of_day = request.time_of_day;

        let candidates = match inner.resolver.find_available_slots(department, time_of_day) {
            Ok(c) => c,
            Err(e) => return backend_failure("book", user_id, &e),
        };

        if candidates.is_empty() {
            return Outcome::failed(
                FailureKind::NoSlots,
                format!("No available slots found for {department} in the {time_of_day}."),
            );
        }

        let Some(slot) = candidates
            .into_iter()
            .find(|s| !inner.calendar.has_conflict(user_id, s))
        else {
            return Outcome::failed(
                FailureKind::AllConflict,
                "Found slots, but they all conflict with your existing schedule.",
            );
        };

        let appointment = match inner.resolver.book_slot(user_id, &slot) {
            Ok(a) => a,
            Err(e) => return backend_failure("book", user_id, &e),
        };
        inner.calendar.add(user_id, &appointment.id, &slot);

        tracing::info!(user = user_id, appointment = %appointment.id, slot = %slot.slot_id, "appointment booked");

        Outcome::succeeded(
            "Appointment booked successfully.",
            appointment.id,
            Some(Slot { booked: true, ..slot }),
        )
    }

    pub fn reschedule(
        &self,
        user_id: &str,
        request: &RequestAttributes,
        session: &Session,
    ) -> Outcome {
        let Some(appointment_id) = session.last_appointment_id.as_deref() else {
            return Outcome::failed(
                FailureKind::NoPreviousAppointment,
                "I couldn't find a previous appointment to reschedule.",
            );
        };

        let mut inner = self.inner();
        let department = request.department;
        let time_of_day = request.time_of_day;

        let candidates = match inner.resolver.find_available_slots(department, time_of_day) {
            Ok(c) => c,
            Err(e) => return backend_failure("reschedule", user_id, &e),
        };

        let Some(new_slot) = candidates.into_iter().next() else {
            return Outcome::failed(
                FailureKind::NoSlots,
                format!("No alternative slots available for {department} in the {time_of_day}."),
            );
        };

        if let Err(e) = inner.resolver.reschedule_appointment(appointment_id, &new_slot) {
            return backend_failure("reschedule", user_id, &e);
        }
        inner.calendar.update(user_id, appointment_id, &new_slot);

        tracing::info!(user = user_id, appointment = appointment_id, slot = %new_slot.slot_id, "appointment rescheduled");

        Outcome::succeeded(
            "Appointment rescheduled successfully.",
            appointment_id.to_string(),
            Some(Slot { booked: true, ..new_slot }),
        )
    }

    pub fn cancel(&self, user_id: &str, session: &Session) -> Outcome {
        let Some(appointment_id) = session.last_appointment_id.as_deref() else {
            return Outcome::failed(
                FailureKind::NoPreviousAppointment,
                "I couldn't find a previous appointment to cancel.",
            );
        };

        let mut inner = self.inner();
        if let Err(e) = inner.resolver.cancel_appointment(appointment_id) {
            return backend_failure("cancel", user_id, &e);
        }
        inner.calendar.remove(user_id, appointment_id);

        tracing::info!(user = user_id, appointment = appointment_id, "appointment canceled");

        Outcome::succeeded("Your appointment has been canceled.", appointment_id.to_string(), None)
    }

    pub fn find_available_slots(
        &self,
        request: &RequestAttributes,
    ) -> Result<Vec<Slot>, SchedulingError> {
        self.inner()
            .resolver
            .find_available_slots(request.department, request.time_of_day)
    }

    pub fn appointment(&self, appointment_id: &str) -> Result<(Appointment, Slot), SchedulingError> {
        self.inner().resolver.appointment(appointment_id)
    }

    pub fn slots(&self) -> Result<Vec<Slot>, SchedulingError> {
        self.inner().resolver.slots()
    }

    pub fn calendar_entries(&self, user_id: &str) -> Vec<CalendarEntry> {
        self.inner().calendar.entries(user_id).to_vec()
    }
}

fn backend_failure(action: &str, user_id: &str, error: &SchedulingError) -> Outcome {
    match error {
        SchedulingError::Store(_) => {
            tracing::error!(user = user_id, action, error = %error, "scheduler backend failure");
        }
        _ => {
            tracing::warn!(user = user_id, action, error = %error, "scheduler rejected request");
        }
    }
    Outcome::failed(
        FailureKind::Backend,
        format!("Unable to {action} the appointment due to an internal error."),
    )
}
