use anyhow::{Error, Result, anyhow};
use serde::Serialize;

use super::models::ReminderChange;
use super::provider::{CalendarError, CalendarProvider};
use super::reconcile::{ReminderSettings, plan, reconcile};

/// How the caller treats provider errors once the data edit has been
/// committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncFailurePolicy {
    /// Log the error and report an advisory message
    #[default]
    LogAndContinue,
    /// Return the error to the caller
    Propagate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    Unchanged,
    NotConnected,
    Synced {
        created: Vec<String>,
        deleted: Vec<String>,
    },
    Failed {
        advisory: String,
    },
}

impl SyncOutcome {
    pub fn advisory(&self) -> Option<String> {
        match self {
            SyncOutcome::Failed { advisory } => Some(advisory.clone()),
            _ => None,
        }
    }
}

/// True when any of the changes needs a calendar call.
pub fn needs_sync(changes: &[ReminderChange]) -> bool {
    changes
        .iter()
        .any(|c| !plan(c.previous.as_ref(), c.current.as_ref()).is_empty())
}

fn advisory_for(err: &CalendarError) -> String {
    match err {
        CalendarError::StaleOrMissingCredential(_) => {
            "Saved, but your calendar connection has expired. Sign in with Google again to resume reminder sync.".to_string()
        }
        CalendarError::ProviderUnavailable(_) => {
            "Saved, but the calendar could not be updated. Reminders may be out of date.".to_string()
        }
    }
}

/// Reconcile every slot in `changes`. Slots are independent: a failure
/// in one does not stop the next.
pub async fn sync_reminders(
    provider: &dyn CalendarProvider,
    settings: &ReminderSettings,
    policy: SyncFailurePolicy,
    changes: &[ReminderChange],
) -> Result<SyncOutcome, Error> {
    if !needs_sync(changes) {
        return Ok(SyncOutcome::Unchanged);
    }

    let mut created = Vec::new();
    let mut deleted = Vec::new();
    let mut first_error: Option<CalendarError> = None;

    for change in changes {
        match reconcile(provider, settings, change).await {
            Ok(report) => {
                created.extend(report.created);
                deleted.extend(report.deleted);
            }
            Err(err) => {
                tracing::error!("Syncing {} reminder failed: {}", change.kind.label(), err);
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
    }

    match (first_error, policy) {
        (None, _) => Ok(SyncOutcome::Synced { created, deleted }),
        (Some(err), SyncFailurePolicy::LogAndContinue) => Ok(SyncOutcome::Failed {
            advisory: advisory_for(&err),
        }),
        (Some(err), SyncFailurePolicy::Propagate) => {
            Err(anyhow!(err).context("Reminder sync failed"))
        }
    }
}
