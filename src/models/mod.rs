pub mod appointment;
pub mod calendar;
pub mod intent;
pub mod outcome;
pub mod session;
pub mod slot;

pub use appointment::{Appointment, AppointmentStatus};
pub use calendar::CalendarEntry;
pub use intent::{Classification, Department, Intent, RequestAttributes, TimeOfDay};
pub use outcome::{FailureKind, Outcome};
pub use session::Session;
pub use slot::{Slot, SlotCatalog};
