//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};
use http::Request;
use tokio_rusqlite::Connection;

use kindred::accounts::{Credential, User, create_session, save_credential, upsert_user};
use kindred::api::AppState;
use kindred::api::app;
use kindred::core::AppConfig;
use kindred::core::db::{enable_foreign_keys, initialize_db};

/// Config pointing every Google endpoint at `google_url`, usually a
/// `mockito` server.
pub fn test_config(google_url: &str) -> AppConfig {
    AppConfig {
        storage_path: String::from("./"),
        db_path: String::from("./db"),
        google_client_id: String::from("test_client_id"),
        google_client_secret: String::from("test_client_secret"),
        google_redirect_uri: String::from("http://localhost:3000/api/auth/google/callback"),
        google_api_hostname: google_url.to_string(),
        google_oauth_hostname: google_url.to_string(),
        google_accounts_hostname: google_url.to_string(),
        google_userinfo_url: format!("{}/v1/userinfo", google_url),
        calendar_id: String::from("primary"),
        time_zone: chrono_tz::America::Los_Angeles,
        sync_strict: false,
        continue_after_create_failure: false,
    }
}

/// Creates a test application router backed by an in-memory database.
/// The returned connection shares that database.
pub async fn test_app(config: AppConfig) -> (Router, Connection) {
    let db = Connection::open_in_memory()
        .await
        .expect("Failed to open in-memory db");
    enable_foreign_keys(&db).await.unwrap();
    db.call(|conn| {
        initialize_db(conn).expect("Failed to initialize db");
        Ok(())
    })
    .await
    .unwrap();

    let app_state = AppState::new(db.clone(), config);
    (app(Arc::new(RwLock::new(app_state))), db)
}

/// A signed-in user and their session token.
pub async fn seed_user(db: &Connection, email: &str) -> (User, String) {
    let user = upsert_user(db, "Test User", email).await.unwrap();
    let token = create_session(db, user.id).await.unwrap();
    (user, token)
}

/// Store a calendar credential that will not need a refresh.
pub async fn connect_calendar(db: &Connection, user_id: i64, google_url: &str) {
    let credential = Credential {
        access_token: String::from("ya29.test"),
        refresh_token: Some(String::from("1//test")),
        token_uri: format!("{}/token", google_url),
        client_id: String::from("test_client_id"),
        client_secret: String::from("test_client_secret"),
        scopes: vec![String::from("https://www.googleapis.com/auth/calendar")],
        expires_at: Some(chrono::Utc::now().timestamp() + 3600),
    };
    save_credential(db, user_id, &credential).await.unwrap();
}

pub fn authed(method: &str, uri: &str, token: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}
