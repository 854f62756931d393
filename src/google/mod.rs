//! Google sign-in and calendar access

pub mod gcal;
pub mod oauth;

use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use crate::accounts::{find_credential, save_credential};
use crate::core::AppConfig;
use gcal::GoogleCalendar;

/// Calendar client for `user_id`, or `None` when they never connected
/// a Google account.
pub async fn connect_calendar(
    db: &Connection,
    config: &AppConfig,
    user_id: i64,
) -> Result<Option<GoogleCalendar>, Error> {
    let credential = find_credential(db, user_id).await?;
    Ok(credential.map(|c| GoogleCalendar::new(&config.google_api_hostname, c)))
}

/// Store the credential again if the client had to refresh it.
pub async fn save_rotated_credential(
    db: &Connection,
    user_id: i64,
    calendar: &GoogleCalendar,
) -> Result<(), Error> {
    if let Some(credential) = calendar.rotated_credential().await {
        tracing::debug!("Saving refreshed calendar credential for user {}", user_id);
        save_credential(db, user_id, &credential).await?;
    }
    Ok(())
}
