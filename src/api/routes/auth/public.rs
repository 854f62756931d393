//! Public types for the auth API
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: String,
    /// Set by Google when the user declined consent
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_token: String,
    pub user_id: i64,
    pub username: String,
}

#[derive(Serialize, Deserialize)]
pub struct WhoAmIResponse {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub calendar_connected: bool,
}
