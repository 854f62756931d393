//! In-memory calendar used by the reminder tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};

use super::models::{CalendarEvent, ReminderEvent};
use super::provider::{CalendarError, CalendarProvider};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Insert { summary: String, date: NaiveDate },
    List { query: String, date: NaiveDate },
    Delete(String),
}

#[derive(Default)]
pub struct RecordingProvider {
    calls: Mutex<Vec<Call>>,
    events: Mutex<Vec<(CalendarEvent, NaiveDate)>>,
    fail_inserts: bool,
    fail_lists: bool,
}

impl RecordingProvider {
    pub fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Default::default()
        }
    }

    /// Every call but delete fails.
    pub fn unavailable() -> Self {
        Self {
            fail_inserts: true,
            fail_lists: true,
            ..Default::default()
        }
    }

    pub fn seed(&self, id: &str, summary: &str, date: NaiveDate) {
        let event = CalendarEvent {
            id: id.to_string(),
            summary: Some(summary.to_string()),
            start: Some(date.to_string()),
            end: None,
        };
        self.events.lock().unwrap().push((event, date));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarProvider for RecordingProvider {
    async fn insert_event(
        &self,
        _calendar_id: &str,
        event: &ReminderEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        self.calls.lock().unwrap().push(Call::Insert {
            summary: event.summary.clone(),
            date: event.date,
        });
        if self.fail_inserts {
            return Err(CalendarError::ProviderUnavailable(
                "503 Service Unavailable".to_string(),
            ));
        }

        let mut events = self.events.lock().unwrap();
        let created = CalendarEvent {
            id: format!("evt-{}", events.len() + 1),
            summary: Some(event.summary.clone()),
            start: Some(event.date.to_string()),
            end: None,
        };
        events.push((created.clone(), event.date));
        Ok(created)
    }

    async fn list_events(
        &self,
        _calendar_id: &str,
        time_min: DateTime<FixedOffset>,
        time_max: DateTime<FixedOffset>,
        query: &str,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.calls.lock().unwrap().push(Call::List {
            query: query.to_string(),
            date: time_min.date_naive(),
        });
        if self.fail_lists {
            return Err(CalendarError::StaleOrMissingCredential(
                "401 Unauthorized".to_string(),
            ));
        }

        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|(event, date)| {
                *date >= time_min.date_naive()
                    && *date <= time_max.date_naive()
                    && event
                        .summary
                        .as_deref()
                        .is_some_and(|summary| summary.contains(query))
            })
            .map(|(event, _)| event.clone())
            .collect())
    }

    async fn delete_event(&self, _calendar_id: &str, event_id: &str) -> Result<(), CalendarError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete(event_id.to_string()));
        self.events
            .lock()
            .unwrap()
            .retain(|(event, _)| event.id != event_id);
        Ok(())
    }
}
