//! Router for the calendar API

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::{Router, extract::State, response::Json};
use axum_extra::extract::Query;

use super::public;
use crate::api::public::ApiError;
use crate::api::session::AuthUser;
use crate::api::state::AppState;
use crate::google::{connect_calendar, save_rotated_credential};

type SharedState = Arc<RwLock<AppState>>;

const MAX_UPCOMING_EVENTS: usize = 10;

async fn calendar_handler(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(params): Query<public::CalendarQuery>,
) -> Result<Json<Vec<public::CalendarResponse>>, ApiError> {
    let (db, config) = {
        let shared_state = state.read().expect("Unable to read share state");
        (shared_state.db.clone(), shared_state.config.clone())
    };
    let user_id = auth.user.id;

    let calendar = connect_calendar(&db, &config, user_id).await?.ok_or_else(|| {
        ApiError::bad_request(anyhow!("No calendar connected. Sign in with Google first."))
    })?;

    // Default to 7 days ahead if not specified
    let days_ahead = params.days_ahead.unwrap_or(7);
    let calendar_id = params
        .calendar_id
        .unwrap_or_else(|| config.calendar_id.clone());

    let now = chrono::Utc::now();
    let end_time = now + chrono::Duration::days(days_ahead);

    let events = calendar
        .upcoming_events(&calendar_id, now, end_time, MAX_UPCOMING_EVENTS)
        .await;
    save_rotated_credential(&db, user_id, &calendar).await?;
    let events = events.map_err(ApiError::calendar)?;

    let resp = events
        .into_iter()
        .map(|event| public::CalendarResponse {
            summary: event.summary.clone().unwrap_or_else(|| "No title".to_string()),
            start: event.start.display(),
            end: event.end.display(),
            id: event.id,
        })
        .collect();

    Ok(Json(resp))
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(calendar_handler))
}
