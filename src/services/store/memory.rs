use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::{Appointment, Slot};

use super::SlotStore;

#[derive(Default)]
struct Tables {
    slots: Vec<Slot>,
    appointments: HashMap<String, Appointment>,
}

/// Volatile store; state is lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new(slots: Vec<Slot>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                slots,
                appointments: HashMap::new(),
            }),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SlotStore for MemoryStore {
    fn list_slots(&self) -> anyhow::Result<Vec<Slot>> {
        Ok(self.tables().slots.clone())
    }

    fn get_slot(&self, slot_id: &str) -> anyhow::Result<Option<Slot>> {
        Ok(self
            .tables()
            .slots
            .iter()
            .find(|s| s.slot_id == slot_id)
            .cloned())
    }

    fn claim_slot(&self, slot_id: &str) -> anyhow::Result<bool> {
        let mut tables = self.tables();
        match tables.slots.iter_mut().find(|s| s.slot_id == slot_id) {
            Some(slot) if !slot.booked => {
                slot.booked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn release_slot(&self, slot_id: &str) -> anyhow::Result<()> {
        let mut tables = self.tables();
        let slot = tables
            .slots
            .iter_mut()
            .find(|s| s.slot_id == slot_id)
            .ok_or_else(|| anyhow::anyhow!("slot not found: {slot_id}"))?;
        slot.booked = false;
        Ok(())
    }

    fn insert_appointment(&self, appointment: &Appointment) -> anyhow::Result<()> {
        let mut tables = self.tables();
        if tables.appointments.contains_key(&appointment.id) {
            anyhow::bail!("appointment already exists: {}", appointment.id);
        }
        tables
            .appointments
            .insert(appointment.id.clone(), appointment.clone());
        Ok(())
    }

    fn get_appointment(&self, id: &str) -> anyhow::Result<Option<Appointment>> {
        Ok(self.tables().appointments.get(id).cloned())
    }

    fn update_appointment(&self, appointment: &Appointment) -> anyhow::Result<()> {
        let mut tables = self.tables();
        let existing = tables
            .appointments
            .get_mut(&appointment.id)
            .ok_or_else(|| anyhow::anyhow!("appointment not found: {}", appointment.id))?;
        *existing = appointment.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotCatalog;

    fn store() -> MemoryStore {
        MemoryStore::new(SlotCatalog::builtin().unwrap().slots)
    }

    #[test]
    fn test_claim_twice_fails() {
        let store = store();
        assert!(store.claim_slot("slot-2").unwrap());
        assert!(!store.claim_slot("slot-2").unwrap());
        assert!(store.get_slot("slot-2").unwrap().unwrap().booked);
    }

    #[test]
    fn test_claim_unknown_slot() {
        let store = store();
        assert!(!store.claim_slot("slot-99").unwrap());
        assert!(store.release_slot("slot-99").is_err());
    }

    #[test]
    fn test_update_missing_appointment_errors() {
        let store = store();
        let appointment = Appointment::new("bob", "slot-1");
        assert!(store.update_appointment(&appointment).is_err());
        store.insert_appointment(&appointment).unwrap();
        assert!(store.insert_appointment(&appointment).is_err());
        assert!(store.update_appointment(&appointment).is_ok());
    }
}
