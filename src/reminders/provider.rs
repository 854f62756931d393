use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use super::models::{CalendarEvent, ReminderEvent};

#[derive(Debug, Error)]
pub enum CalendarError {
    /// Network failure or a non-success response from the provider
    #[error("Calendar provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Access token expired and could not be refreshed, or was rejected
    #[error("Calendar credential is stale or missing: {0}")]
    StaleOrMissingCredential(String),
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        CalendarError::ProviderUnavailable(err.to_string())
    }
}

/// The calendar operations the reconciler needs. Deleting an event
/// that no longer exists is not an error.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &ReminderEvent,
    ) -> Result<CalendarEvent, CalendarError>;

    async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
        query: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), CalendarError>;
}
