use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reminders::{ReminderChange, ReminderKind, ReminderRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub birthday: Option<NaiveDate>,
    pub anniversary: Option<NaiveDate>,
    pub anniversary_title: Option<String>,
    pub relationship: Option<String>,
    pub allergies: Option<String>,
    pub likes: Option<String>,
    pub dislikes: Option<String>,
}

impl Person {
    pub fn birthday_title(&self) -> String {
        format!("{}'s Birthday", self.name)
    }

    pub fn anniversary_title(&self) -> String {
        match &self.anniversary_title {
            Some(title) => title.clone(),
            None => format!("{}'s Anniversary", self.name),
        }
    }

    /// The record mirrored to the calendar for `kind`, if the date is set.
    pub fn reminder(&self, kind: ReminderKind) -> Option<ReminderRecord> {
        match kind {
            ReminderKind::Birthday => self
                .birthday
                .map(|date| ReminderRecord::new(self.birthday_title(), date)),
            ReminderKind::Anniversary => self
                .anniversary
                .map(|date| ReminderRecord::new(self.anniversary_title(), date)),
        }
    }
}

/// Both reminder slots of a person across an edit. `current` is `None`
/// when the person was deleted.
pub fn reminder_changes(previous: &Person, current: Option<&Person>) -> Vec<ReminderChange> {
    [ReminderKind::Birthday, ReminderKind::Anniversary]
        .into_iter()
        .map(|kind| ReminderChange {
            kind,
            previous: previous.reminder(kind),
            current: current.and_then(|p| p.reminder(kind)),
        })
        .collect()
}

/// Edit of a person. Absent fields are left untouched and blank strings
/// clear the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonUpdate {
    pub name: Option<String>,
    pub birthday: Option<String>,
    pub anniversary: Option<String>,
    pub anniversary_title: Option<String>,
    pub relationship: Option<String>,
    pub allergies: Option<String>,
    pub likes: Option<String>,
    pub dislikes: Option<String>,
}

fn blank_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_date(field: &str, value: &str) -> Result<Option<NaiveDate>> {
    match blank_to_none(value) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| anyhow!("Invalid {}: expected YYYY-MM-DD, got {:?}", field, s)),
    }
}

impl PersonUpdate {
    /// Apply the edit to a copy of `person`.
    pub fn apply(&self, person: &Person) -> Result<Person> {
        let mut updated = person.clone();

        if let Some(name) = &self.name {
            updated.name = blank_to_none(name).ok_or_else(|| anyhow!("Name can not be blank"))?;
        }
        if let Some(birthday) = &self.birthday {
            updated.birthday = parse_date("birthday", birthday)?;
        }
        if let Some(anniversary) = &self.anniversary {
            updated.anniversary = parse_date("anniversary", anniversary)?;
        }

        let text_fields = [
            (&self.anniversary_title, &mut updated.anniversary_title),
            (&self.relationship, &mut updated.relationship),
            (&self.allergies, &mut updated.allergies),
            (&self.likes, &mut updated.likes),
            (&self.dislikes, &mut updated.dislikes),
        ];
        for (value, field) in text_fields {
            if let Some(value) = value {
                *field = blank_to_none(value);
            }
        }

        Ok(updated)
    }
}
