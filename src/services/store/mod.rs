pub mod memory;
pub mod sqlite;

use crate::models::{Appointment, Slot};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage boundary for the slot and appointment tables.
///
/// `list_slots` must return slots in a stable listing order; the scheduler's
/// first-match selection depends on it. `claim_slot` is a compare-and-set: it
/// flips `booked` to true only if it was false, and reports whether it did.
pub trait SlotStore: Send + Sync {
    fn list_slots(&self) -> anyhow::Result<Vec<Slot>>;
    fn get_slot(&self, slot_id: &str) -> anyhow::Result<Option<Slot>>;
    fn claim_slot(&self, slot_id: &str) -> anyhow::Result<bool>;
    fn release_slot(&self, slot_id: &str) -> anyhow::Result<()>;

    fn insert_appointment(&self, appointment: &Appointment) -> anyhow::Result<()>;
    fn get_appointment(&self, id: &str) -> anyhow::Result<Option<Appointment>>;
    fn update_appointment(&self, appointment: &Appointment) -> anyhow::Result<()>;
}

/// Picks the backend from a database URL: empty or `:memory:` keeps everything in process.
pub fn open(database_url: &str, catalog: Vec<Slot>) -> anyhow::Result<Box<dyn SlotStore>> {
    if database_url.is_empty() || database_url == ":memory:" {
        tracing::info!(slots = catalog.len(), "using in-memory slot store");
        return Ok(Box::new(MemoryStore::new(catalog)));
    }

    tracing::info!(path = database_url, "using SQLite slot store");
    Ok(Box::new(SqliteStore::open(database_url, &catalog)?))
}
