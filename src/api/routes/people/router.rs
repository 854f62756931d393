//! Router for the people API

use std::sync::{Arc, RwLock};

use anyhow::{Error, Result};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tokio_rusqlite::Connection;

use super::public;
use crate::api::public::ApiError;
use crate::api::session::AuthUser;
use crate::api::state::AppState;
use crate::core::AppConfig;
use crate::google::{connect_calendar, save_rotated_credential};
use crate::people::{
    Person, delete_person, get_person, list_people, reminder_changes, update_person,
};
use crate::reminders::{ReminderChange, SyncOutcome, needs_sync, sync_reminders};

type SharedState = Arc<RwLock<AppState>>;

fn db_and_config(state: &SharedState) -> (Connection, AppConfig) {
    let shared_state = state.read().expect("Unable to read share state");
    (shared_state.db.clone(), shared_state.config.clone())
}

async fn owned_person(db: &Connection, user_id: i64, person_id: i64) -> Result<Person, ApiError> {
    get_person(db, user_id, person_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Person"))
}

/// Mirror reminder changes to the user's calendar, if they connected
/// one.
async fn sync_changes(
    db: &Connection,
    config: &AppConfig,
    user_id: i64,
    changes: &[ReminderChange],
) -> Result<SyncOutcome, Error> {
    if !needs_sync(changes) {
        return Ok(SyncOutcome::Unchanged);
    }
    let Some(calendar) = connect_calendar(db, config, user_id).await? else {
        tracing::debug!("User {} has no calendar connected, skipping reminder sync", user_id);
        return Ok(SyncOutcome::NotConnected);
    };

    let outcome = sync_reminders(
        &calendar,
        &config.reminder_settings(),
        config.sync_failure_policy(),
        changes,
    )
    .await;
    // The edit is already committed, so a lost token is only logged
    if let Err(err) = save_rotated_credential(db, user_id, &calendar).await {
        tracing::error!("Failed to store refreshed credential for user {}: {}", user_id, err);
    }
    outcome
}

async fn index(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<Vec<public::Person>>, ApiError> {
    let (db, _) = db_and_config(&state);
    let people = list_people(&db, auth.user.id).await?;
    Ok(Json(people))
}

async fn view(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<public::Person>, ApiError> {
    let (db, _) = db_and_config(&state);
    let person = owned_person(&db, auth.user.id, id).await?;
    Ok(Json(person))
}

// Save the edit first, then bring the calendar in line with it
async fn edit(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(update): Json<public::PersonUpdate>,
) -> Result<Json<public::PersonResponse>, ApiError> {
    let (db, config) = db_and_config(&state);
    let previous = owned_person(&db, auth.user.id, id).await?;
    let person = update.apply(&previous).map_err(ApiError::bad_request)?;

    update_person(&db, &person).await?;

    let changes = reminder_changes(&previous, Some(&person));
    let sync = sync_changes(&db, &config, auth.user.id, &changes).await?;
    let advisory = sync.advisory();

    Ok(Json(public::PersonResponse {
        person,
        sync,
        advisory,
    }))
}

// Clear both reminders from the calendar before the person goes away
async fn destroy(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<public::DeletePersonResponse>, ApiError> {
    let (db, config) = db_and_config(&state);
    let person = owned_person(&db, auth.user.id, id).await?;

    let changes = reminder_changes(&person, None);
    let sync = sync_changes(&db, &config, auth.user.id, &changes).await?;
    let advisory = sync.advisory();

    delete_person(&db, auth.user.id, person.id).await?;

    Ok(Json(public::DeletePersonResponse {
        success: true,
        sync,
        advisory,
    }))
}

/// Create the people router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}", get(view).put(edit).delete(destroy))
}
