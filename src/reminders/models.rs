use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One of the two reminder slots tracked per person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    Birthday,
    Anniversary,
}

impl ReminderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderKind::Birthday => "birthday",
            ReminderKind::Anniversary => "anniversary",
        }
    }
}

/// A birthday or anniversary as it is mirrored to the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub title: String,
    pub date: NaiveDate,
}

impl ReminderRecord {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
        }
    }
}

/// Previous and current value of one slot across an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderChange {
    pub kind: ReminderKind,
    pub previous: Option<ReminderRecord>,
    pub current: Option<ReminderRecord>,
}

/// A calendar operation decided by the planner, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarOp {
    Create(ReminderRecord),
    /// List events on the record's date matching its title and delete
    /// each of them.
    DeleteMatching(ReminderRecord),
}

/// Notification sent `minutes` before the start of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderOffset {
    pub method: &'static str,
    pub minutes: i64,
}

/// Seven days before at midnight and on the day at midnight.
pub const DEFAULT_OFFSETS: [ReminderOffset; 2] = [
    ReminderOffset {
        method: "email",
        minutes: 7 * 24 * 60,
    },
    ReminderOffset {
        method: "email",
        minutes: 0,
    },
];

/// A yearly all-day event the provider is asked to create.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEvent {
    pub summary: String,
    pub description: String,
    pub date: NaiveDate,
    pub time_zone: Tz,
    pub offsets: Vec<ReminderOffset>,
}

impl ReminderEvent {
    pub fn yearly(kind: ReminderKind, record: &ReminderRecord, time_zone: Tz) -> Self {
        Self {
            summary: record.title.clone(),
            description: format!("Yearly {} reminder", kind.label()),
            date: record.date,
            time_zone,
            offsets: DEFAULT_OFFSETS.to_vec(),
        }
    }

    pub fn recurrence(&self) -> Vec<String> {
        vec!["RRULE:FREQ=YEARLY".to_string()]
    }
}

/// An event as returned by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}
