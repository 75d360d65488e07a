use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::db::{self, queries};
use crate::models::{Appointment, Slot};

use super::SlotStore;

/// Durable store backed by a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database, runs migrations, and seeds the
    /// catalogue into an empty slots table.
    pub fn open(path: &str, catalog: &[Slot]) -> anyhow::Result<Self> {
        let conn = db::init_db(path)?;
        let seeded = queries::seed_slots(&conn, catalog)?;
        if seeded > 0 {
            tracing::info!(seeded, "seeded slot catalogue");
        }
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SlotStore for SqliteStore {
    fn list_slots(&self) -> anyhow::Result<Vec<Slot>> {
        queries::list_slots(&self.conn())
    }

    fn get_slot(&self, slot_id: &str) -> anyhow::Result<Option<Slot>> {
        queries::get_slot(&self.conn(), slot_id)
    }

    fn claim_slot(&self, slot_id: &str) -> anyhow::Result<bool> {
        queries::claim_slot(&self.conn(), slot_id)
    }

    fn release_slot(&self, slot_id: &str) -> anyhow::Result<()> {
        if !queries::release_slot(&self.conn(), slot_id)? {
            anyhow::bail!("slot not found: {slot_id}");
        }
        Ok(())
    }

    fn insert_appointment(&self, appointment: &Appointment) -> anyhow::Result<()> {
        queries::insert_appointment(&self.conn(), appointment)
    }

    fn get_appointment(&self, id: &str) -> anyhow::Result<Option<Appointment>> {
        queries::get_appointment(&self.conn(), id)
    }

    fn update_appointment(&self, appointment: &Appointment) -> anyhow::Result<()> {
        if !queries::update_appointment(&self.conn(), appointment)? {
            anyhow::bail!("appointment not found: {}", appointment.id);
        }
        Ok(())
    }
}
