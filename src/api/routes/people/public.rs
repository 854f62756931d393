//! Public types for the people API
use serde::Serialize;

pub use crate::people::{Person, PersonUpdate};
pub use crate::reminders::SyncOutcome;

/// A saved edit plus what happened to the calendar reminders.
#[derive(Serialize)]
pub struct PersonResponse {
    pub person: Person,
    pub sync: SyncOutcome,
    /// Shown to the user when the data was saved but the calendar
    /// could not be updated
    pub advisory: Option<String>,
}

#[derive(Serialize)]
pub struct DeletePersonResponse {
    pub success: bool,
    pub sync: SyncOutcome,
    pub advisory: Option<String>,
}
