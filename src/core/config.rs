use std::env;

use chrono_tz::Tz;

use crate::reminders::{OrderingPolicy, ReminderSettings, SyncFailurePolicy};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    // Hostnames are configurable so tests can point them at a mock server
    pub google_api_hostname: String,
    pub google_oauth_hostname: String,
    pub google_accounts_hostname: String,
    pub google_userinfo_url: String,
    pub calendar_id: String,
    pub time_zone: Tz,
    pub sync_strict: bool,
    pub continue_after_create_failure: bool,
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    /// URL of the OAuth token endpoint, also stored as the credential's
    /// `token_uri`.
    pub fn token_url(&self) -> String {
        format!("{}/token", self.google_oauth_hostname)
    }

    pub fn reminder_settings(&self) -> ReminderSettings {
        let ordering = if self.continue_after_create_failure {
            OrderingPolicy::ContinueOnCreateFailure
        } else {
            OrderingPolicy::StopOnCreateFailure
        };
        ReminderSettings {
            calendar_id: self.calendar_id.clone(),
            time_zone: self.time_zone,
            ordering,
        }
    }

    pub fn sync_failure_policy(&self) -> SyncFailurePolicy {
        if self.sync_strict {
            SyncFailurePolicy::Propagate
        } else {
            SyncFailurePolicy::LogAndContinue
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("KINDRED_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let google_client_id =
            env::var("KINDRED_GOOGLE_CLIENT_ID").expect("Missing env var KINDRED_GOOGLE_CLIENT_ID");
        let google_client_secret = env::var("KINDRED_GOOGLE_CLIENT_SECRET")
            .expect("Missing env var KINDRED_GOOGLE_CLIENT_SECRET");
        let google_redirect_uri = env::var("KINDRED_GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:3000/api/auth/google/callback".to_string());
        let google_api_hostname = env::var("KINDRED_GOOGLE_API_HOST")
            .unwrap_or_else(|_| "https://www.googleapis.com".to_string());
        let google_oauth_hostname = env::var("KINDRED_GOOGLE_OAUTH_HOST")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com".to_string());
        let google_accounts_hostname = env::var("KINDRED_GOOGLE_ACCOUNTS_HOST")
            .unwrap_or_else(|_| "https://accounts.google.com".to_string());
        let google_userinfo_url = env::var("KINDRED_GOOGLE_USERINFO_URL")
            .unwrap_or_else(|_| "https://openidconnect.googleapis.com/v1/userinfo".to_string());
        let calendar_id = env::var("KINDRED_CALENDAR_ID").unwrap_or_else(|_| "primary".to_string());
        let time_zone = env::var("KINDRED_TIME_ZONE")
            .unwrap_or_else(|_| "America/Los_Angeles".to_string())
            .parse::<Tz>()
            .expect("KINDRED_TIME_ZONE is not a valid IANA time zone");

        Self {
            storage_path,
            db_path,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            google_api_hostname,
            google_oauth_hostname,
            google_accounts_hostname,
            google_userinfo_url,
            calendar_id,
            time_zone,
            sync_strict: env_flag("KINDRED_SYNC_STRICT"),
            continue_after_create_failure: env_flag("KINDRED_CONTINUE_AFTER_CREATE_FAILURE"),
        }
    }
}
