//! Router for Google sign-in and sessions

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::State,
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::Query;
use serde_json::{Value, json};
use uuid::Uuid;

use super::public;
use crate::accounts::{
    create_session, delete_session, find_credential, insert_oauth_state, save_credential,
    take_oauth_state, upsert_user,
};
use crate::api::public::ApiError;
use crate::api::session::AuthUser;
use crate::api::state::AppState;
use crate::google::oauth::{authorization_url, exchange_code_for_token, fetch_userinfo};

type SharedState = Arc<RwLock<AppState>>;

// Send the user to Google's consent screen
async fn google_sign_in(State(state): State<SharedState>) -> Result<Redirect, ApiError> {
    let (db, config) = {
        let shared_state = state.read().expect("Unable to read share state");
        (shared_state.db.clone(), shared_state.config.clone())
    };

    let csrf_state = Uuid::new_v4().to_string();
    insert_oauth_state(&db, &csrf_state).await?;

    let url = authorization_url(
        &config.google_accounts_hostname,
        &config.google_client_id,
        &config.google_redirect_uri,
        &csrf_state,
    );
    Ok(Redirect::to(&url))
}

async fn google_callback(
    State(state): State<SharedState>,
    Query(params): Query<public::CallbackQuery>,
) -> Result<Json<public::SessionResponse>, ApiError> {
    let (db, config) = {
        let shared_state = state.read().expect("Unable to read share state");
        (shared_state.db.clone(), shared_state.config.clone())
    };

    if !take_oauth_state(&db, &params.state).await? {
        return Err(ApiError::bad_request(anyhow!("Unknown or expired sign-in state")));
    }
    if let Some(error) = params.error {
        return Err(ApiError::bad_request(anyhow!("Google sign-in failed: {}", error)));
    }
    let code = params
        .code
        .ok_or_else(|| ApiError::bad_request(anyhow!("Missing authorization code")))?;

    let token_url = config.token_url();
    let token = exchange_code_for_token(
        &token_url,
        &config.google_client_id,
        &config.google_client_secret,
        &code,
        &config.google_redirect_uri,
    )
    .await?;
    let info = fetch_userinfo(&config.google_userinfo_url, &token.access_token).await?;
    let email = info
        .verified_email()
        .ok_or_else(|| ApiError::bad_request(anyhow!("Google account email is not verified")))?
        .to_string();
    let username = info.name.clone().unwrap_or_else(|| email.clone());

    let user = upsert_user(&db, &username, &email).await?;
    let credential = token.into_credential(
        &token_url,
        &config.google_client_id,
        &config.google_client_secret,
    );
    save_credential(&db, user.id, &credential).await?;
    let session_token = create_session(&db, user.id).await?;
    tracing::info!("User {} signed in", user.id);

    Ok(Json(public::SessionResponse {
        session_token,
        user_id: user.id,
        username: user.username,
    }))
}

async fn whoami(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<public::WhoAmIResponse>, ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    let calendar_connected = find_credential(&db, auth.user.id).await?.is_some();
    Ok(Json(public::WhoAmIResponse {
        user_id: auth.user.id,
        username: auth.user.username,
        email: auth.user.email,
        calendar_connected,
    }))
}

async fn logout(State(state): State<SharedState>, auth: AuthUser) -> Result<Json<Value>, ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();
    delete_session(&db, &auth.token).await?;
    Ok(Json(json!({ "success": true })))
}

/// Create the auth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/google", get(google_sign_in))
        .route("/google/callback", get(google_callback))
        .route("/session", get(whoami))
        .route("/logout", post(logout))
}
