//! API routes module

pub mod auth;
pub mod calendar;
pub mod groups;
pub mod people;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Google sign-in and sessions
        .nest("/auth", auth::router())
        // Groups and their members
        .nest("/groups", groups::router())
        // People and their reminders
        .nest("/people", people::router())
        // Upcoming calendar events
        .nest("/calendar", calendar::router())
}
