use serde::{Deserialize, Serialize};

/// Refresh this many seconds before the provider would reject the token.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// OAuth token set for one user's calendar access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    /// Unix timestamp, `None` when the provider did not say
    pub expires_at: Option<i64>,
}

impl Credential {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at - EXPIRY_SKEW_SECS <= now)
    }

    pub fn scopes_str(&self) -> String {
        self.scopes.join(" ")
    }

    pub fn parse_scopes(scopes: &str) -> Vec<String> {
        scopes.split_whitespace().map(str::to_string).collect()
    }
}
