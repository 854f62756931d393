//! Router for the groups API

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use http::StatusCode;
use serde_json::{Value, json};
use tokio_rusqlite::Connection;

use super::public;
use crate::api::public::ApiError;
use crate::api::session::AuthUser;
use crate::api::state::AppState;
use crate::groups::{
    Group, add_member, create_group, delete_group, get_group, list_groups, list_members,
    remove_member,
};

type SharedState = Arc<RwLock<AppState>>;

fn db(state: &SharedState) -> Connection {
    state.read().expect("Unable to read share state").db.clone()
}

async fn owned_group(db: &Connection, user_id: i64, group_id: i64) -> Result<Group, ApiError> {
    get_group(db, user_id, group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Group"))
}

async fn index(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<Vec<public::Group>>, ApiError> {
    let groups = list_groups(&db(&state), auth.user.id).await?;
    Ok(Json(groups))
}

async fn create(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(body): Json<public::CreateGroupRequest>,
) -> Result<(StatusCode, Json<public::Group>), ApiError> {
    let group_name = body.group_name.trim();
    if group_name.is_empty() {
        return Err(ApiError::bad_request(anyhow!("Group name can not be blank")));
    }
    let group = create_group(&db(&state), auth.user.id, group_name).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

async fn view(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<public::GroupDetail>, ApiError> {
    let db = db(&state);
    let group = owned_group(&db, auth.user.id, id).await?;
    let members = list_members(&db, group.id).await?;
    Ok(Json(public::GroupDetail { group, members }))
}

async fn destroy(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    if !delete_group(&db(&state), auth.user.id, id).await? {
        return Err(ApiError::not_found("Group"));
    }
    Ok(Json(json!({ "success": true })))
}

async fn add(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(body): Json<public::AddMemberRequest>,
) -> Result<Json<public::Person>, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request(anyhow!("Name can not be blank")));
    }
    let db = db(&state);
    let group = owned_group(&db, auth.user.id, id).await?;
    let person = add_member(&db, &group, name).await?;
    Ok(Json(person))
}

async fn remove(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path((id, person_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    let db = db(&state);
    let group = owned_group(&db, auth.user.id, id).await?;
    if !remove_member(&db, group.id, person_id).await? {
        return Err(ApiError::not_found("Member"));
    }
    Ok(Json(json!({ "success": true })))
}

/// Create the groups router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", get(view).delete(destroy))
        .route("/{id}/members", post(add))
        .route("/{id}/members/{person_id}", delete(remove))
}
