pub mod ai;
pub mod availability;
pub mod calendar;
pub mod classifier;
pub mod coordinator;
pub mod formatter;
pub mod scheduling;
pub mod session;
pub mod store;
