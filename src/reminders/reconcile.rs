//! Keeps a person's recurring birthday and anniversary events in line
//! with their record after an edit.
//!
//! Planning is pure (`plan`); `reconcile` runs the plan against a
//! `CalendarProvider`. Each reconciliation is a short sequence of
//! provider calls made one after another.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

use super::models::{CalendarOp, ReminderChange, ReminderEvent, ReminderRecord};
use super::provider::{CalendarError, CalendarProvider};

/// What to do with the delete-scan of the previous event when creating
/// the replacement fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingPolicy {
    /// Skip the delete-scan so the stale event survives a failed create.
    #[default]
    StopOnCreateFailure,
    /// Run the delete-scan anyway and report the create error afterwards.
    ContinueOnCreateFailure,
}

#[derive(Debug, Clone)]
pub struct ReminderSettings {
    pub calendar_id: String,
    pub time_zone: Tz,
    pub ordering: OrderingPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Option<String>,
    pub deleted: Vec<String>,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.created.is_none() && self.deleted.is_empty()
    }
}

/// Decide which calendar operations an edit needs, in the order they
/// must run. Creating the new event always comes before deleting the
/// old one.
pub fn plan(previous: Option<&ReminderRecord>, current: Option<&ReminderRecord>) -> Vec<CalendarOp> {
    match (previous, current) {
        (None, None) => vec![],
        (None, Some(current)) => vec![CalendarOp::Create(current.clone())],
        (Some(previous), None) => vec![CalendarOp::DeleteMatching(previous.clone())],
        (Some(previous), Some(current)) if previous == current => vec![],
        (Some(previous), Some(current)) => vec![
            CalendarOp::Create(current.clone()),
            CalendarOp::DeleteMatching(previous.clone()),
        ],
    }
}

/// Start and end (00:00 to 23:59) of `date` in `tz`.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let local = |time: NaiveTime| {
        let naive = date.and_time(time);
        // A DST gap can swallow midnight, start at the first instant
        // that exists on that day
        tz.from_local_datetime(&naive)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
            .unwrap_or_else(|| tz.from_utc_datetime(&naive))
            .fixed_offset()
    };
    (
        local(NaiveTime::MIN),
        local(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)),
    )
}

async fn delete_matching(
    provider: &dyn CalendarProvider,
    settings: &ReminderSettings,
    record: &ReminderRecord,
) -> Result<Vec<String>, CalendarError> {
    let (time_min, time_max) = day_bounds(record.date, settings.time_zone);
    let events = provider
        .list_events(&settings.calendar_id, time_min, time_max, &record.title)
        .await?;

    let mut deleted = Vec::new();
    for event in events {
        // The provider query is full text, only exact titles are ours
        if event.summary.as_deref() != Some(record.title.as_str()) {
            continue;
        }
        provider
            .delete_event(&settings.calendar_id, &event.id)
            .await?;
        tracing::info!("Deleted calendar event {} ({})", event.id, record.title);
        deleted.push(event.id);
    }

    if deleted.is_empty() {
        tracing::debug!(
            "No calendar event found for {} on {}",
            record.title,
            record.date
        );
    }

    Ok(deleted)
}

/// Apply one slot's change to the calendar.
pub async fn reconcile(
    provider: &dyn CalendarProvider,
    settings: &ReminderSettings,
    change: &ReminderChange,
) -> Result<ReconcileReport, CalendarError> {
    let mut report = ReconcileReport::default();
    let mut create_error = None;

    for op in plan(change.previous.as_ref(), change.current.as_ref()) {
        match op {
            CalendarOp::Create(record) => {
                let event = ReminderEvent::yearly(change.kind, &record, settings.time_zone);
                match provider.insert_event(&settings.calendar_id, &event).await {
                    Ok(created) => {
                        tracing::info!("Created calendar event {} ({})", created.id, record.title);
                        report.created = Some(created.id);
                    }
                    Err(err) => match settings.ordering {
                        OrderingPolicy::StopOnCreateFailure => return Err(err),
                        OrderingPolicy::ContinueOnCreateFailure => {
                            tracing::warn!(
                                "Creating {} failed, removing the previous event anyway: {}",
                                record.title,
                                err
                            );
                            create_error = Some(err);
                        }
                    },
                }
            }
            CalendarOp::DeleteMatching(record) => {
                match delete_matching(provider, settings, &record).await {
                    Ok(deleted) => report.deleted.extend(deleted),
                    // The failed create is the error the caller must see
                    Err(err) => match create_error.take() {
                        Some(create_err) => {
                            tracing::error!(
                                "Removing the previous {} event failed as well: {}",
                                record.title,
                                err
                            );
                            return Err(create_err);
                        }
                        None => return Err(err),
                    },
                }
            }
        }
    }

    match create_error {
        Some(err) => Err(err),
        None => Ok(report),
    }
}
