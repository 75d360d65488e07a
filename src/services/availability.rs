use crate::models::{Appointment, AppointmentStatus, Department, Slot, TimeOfDay};
use crate::services::store::SlotStore;

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),

    #[error("appointment {0} is already canceled")]
    AppointmentCanceled(String),

    #[error("slot not found: {0}")]
    SlotNotFound(String),

    #[error("slot {0} is already booked")]
    SlotTaken(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Slot lookups and slot mutations over a [`SlotStore`].
///
/// Every mutation keeps the booked flag in step with appointments: a slot is
/// booked exactly while one non-canceled appointment points at it.
pub struct AvailabilityResolver {
    store: Box<dyn SlotStore>,
}

impl AvailabilityResolver {
    pub fn new(store: Box<dyn SlotStore>) -> Self {
        Self { store }
    }

    /// Unbooked slots matching the request, in store listing order.
    pub fn find_available_slots(
        &self,
        department: Department,
        time_of_day: TimeOfDay,
    ) -> Result<Vec<Slot>, SchedulingError> {
        Ok(self
            .store
            .list_slots()?
            .into_iter()
            .filter(|s| !s.booked)
            .filter(|s| department.matches(s.department))
            .filter(|s| time_of_day.matches(s.time_of_day))
            .collect())
    }

    pub fn book_slot(&self, user_id: &str, slot: &Slot) -> Result<Appointment, SchedulingError> {
        if !self.store.claim_slot(&slot.slot_id)? {
            return Err(SchedulingError::SlotTaken(slot.slot_id.clone()));
        }

        let appointment = Appointment::new(user_id, &slot.slot_id);
        if let Err(e) = self.store.insert_appointment(&appointment) {
            if let Err(release_err) = self.store.release_slot(&slot.slot_id) {
                tracing::error!(slot = %slot.slot_id, error = %release_err, "failed to release slot after aborted booking");
            }
            return Err(e.into());
        }

        Ok(appointment)
    }

    pub fn reschedule_appointment(
        &self,
        appointment_id: &str,
        new_slot: &Slot,
    ) -> Result<Appointment, SchedulingError> {
        let original = self.active_appointment(appointment_id)?;

        if !self.store.claim_slot(&new_slot.slot_id)? {
            return Err(SchedulingError::SlotTaken(new_slot.slot_id.clone()));
        }

        let mut appointment = original.clone();
        appointment.slot_id = new_slot.slot_id.clone();
        appointment.updated_at = chrono::Utc::now().naive_utc();
        if let Err(e) = self.store.update_appointment(&appointment) {
            self.release_or_log(&new_slot.slot_id);
            return Err(e.into());
        }

        if let Err(e) = self.store.release_slot(&original.slot_id) {
            // Point the appointment back at the slot that is still booked.
            self.restore_or_log(&original);
            self.release_or_log(&new_slot.slot_id);
            return Err(e.into());
        }

        Ok(appointment)
    }

    pub fn cancel_appointment(&self, appointment_id: &str) -> Result<Appointment, SchedulingError> {
        let original = self.active_appointment(appointment_id)?;

        let mut appointment = original.clone();
        appointment.status = AppointmentStatus::Canceled;
        appointment.updated_at = chrono::Utc::now().naive_utc();
        self.store.update_appointment(&appointment)?;

        if let Err(e) = self.store.release_slot(&original.slot_id) {
            self.restore_or_log(&original);
            return Err(e.into());
        }

        Ok(appointment)
    }

    pub fn appointment(&self, appointment_id: &str) -> Result<(Appointment, Slot), SchedulingError> {
        let appointment = self
            .store
            .get_appointment(appointment_id)?
            .ok_or_else(|| SchedulingError::AppointmentNotFound(appointment_id.to_string()))?;
        let slot = self
            .store
            .get_slot(&appointment.slot_id)?
            .ok_or_else(|| SchedulingError::SlotNotFound(appointment.slot_id.clone()))?;
        Ok((appointment, slot))
    }

    pub fn slots(&self) -> Result<Vec<Slot>, SchedulingError> {
        Ok(self.store.list_slots()?)
    }

    fn active_appointment(&self, appointment_id: &str) -> Result<Appointment, SchedulingError> {
        let appointment = self
            .store
            .get_appointment(appointment_id)?
            .ok_or_else(|| SchedulingError::AppointmentNotFound(appointment_id.to_string()))?;
        if !appointment.is_active() {
            return Err(SchedulingError::AppointmentCanceled(appointment_id.to_string()));
        }
        Ok(appointment)
    }

    fn release_or_log(&self, slot_id: &str) {
        if let Err(e) = self.store.release_slot(slot_id) {
            tracing::error!(slot = slot_id, error = %e, "failed to release slot after aborted change");
        }
    }

    fn restore_or_log(&self, appointment: &Appointment) {
        if let Err(e) = self.store.update_appointment(appointment) {
            tracing::error!(appointment = %appointment.id, error = %e, "failed to restore appointment after aborted change");
        }
    }
}
