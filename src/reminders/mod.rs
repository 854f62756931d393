//! Birthday and anniversary reminders mirrored to an external calendar.

pub mod models;
pub mod provider;
pub mod reconcile;
pub mod sync;
#[cfg(test)]
pub(crate) mod testing;

pub use models::*;
pub use provider::{CalendarError, CalendarProvider};
pub use reconcile::{OrderingPolicy, ReconcileReport, ReminderSettings, plan, reconcile};
pub use sync::{SyncFailurePolicy, SyncOutcome, needs_sync, sync_reminders};
