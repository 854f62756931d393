//! Session authentication for API handlers

use std::sync::{Arc, RwLock};

use axum::extract::FromRequestParts;
use http::header::AUTHORIZATION;
use http::request::Parts;

use crate::accounts::{User, find_session_user};
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// The signed-in user, resolved from an `Authorization: Bearer <token>`
/// header. Rejects the request with 401 otherwise.
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(ApiError::unauthorized)?;
        let db = state.read().expect("Unable to read share state").db.clone();
        let user = find_session_user(&db, &token)
            .await?
            .ok_or_else(ApiError::unauthorized)?;
        Ok(AuthUser { user, token })
    }
}
