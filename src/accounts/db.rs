use anyhow::{Error, Result};
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;
use uuid::Uuid;

use super::models::{Credential, User};

/// Find the user with `email` or create one. The username is refreshed
/// on every sign in.
pub async fn upsert_user(db: &Connection, username: &str, email: &str) -> Result<User, Error> {
    let username = username.to_owned();
    let email = email.to_owned();
    let user = db
        .call(move |conn| {
            let id: i64 = conn.query_row(
                "INSERT INTO user (username, email) VALUES (?1, ?2)
                 ON CONFLICT(email) DO UPDATE SET username = excluded.username
                 RETURNING id",
                [&username, &email],
                |row| row.get(0),
            )?;
            Ok(User {
                id,
                username,
                email,
            })
        })
        .await?;
    Ok(user)
}

/// Start a session for `user_id` and return its opaque token.
pub async fn create_session(db: &Connection, user_id: i64) -> Result<String, Error> {
    let token = Uuid::new_v4().to_string();
    let session_id = token.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO session (id, user_id) VALUES (?, ?)",
            tokio_rusqlite::params![session_id, user_id],
        )?;
        Ok(())
    })
    .await?;
    Ok(token)
}

pub async fn find_session_user(db: &Connection, token: &str) -> Result<Option<User>, Error> {
    let token = token.to_owned();
    let user = db
        .call(move |conn| {
            let user = conn
                .query_row(
                    r"
                    SELECT user.id, user.username, user.email
                    FROM session
                    JOIN user ON user.id = session.user_id
                    WHERE session.id = ?
                    ",
                    [token],
                    |row| {
                        Ok(User {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            email: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(user)
        })
        .await?;
    Ok(user)
}

pub async fn delete_session(db: &Connection, token: &str) -> Result<(), Error> {
    let token = token.to_owned();
    db.call(move |conn| {
        conn.execute("DELETE FROM session WHERE id = ?", [token])?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn insert_oauth_state(db: &Connection, state: &str) -> Result<(), Error> {
    let state = state.to_owned();
    db.call(move |conn| {
        conn.execute("INSERT INTO oauth_state (state) VALUES (?)", [state])?;
        Ok(())
    })
    .await?;
    Ok(())
}

/// Consume a sign-in state. Returns false when it was never issued or
/// has already been used.
pub async fn take_oauth_state(db: &Connection, state: &str) -> Result<bool, Error> {
    let state = state.to_owned();
    let removed = db
        .call(move |conn| {
            let removed = conn.execute("DELETE FROM oauth_state WHERE state = ?", [state])?;
            Ok(removed)
        })
        .await?;
    Ok(removed > 0)
}

pub async fn save_credential(
    db: &Connection,
    user_id: i64,
    credential: &Credential,
) -> Result<(), Error> {
    let credential = credential.clone();
    db.call(move |conn| {
        conn.execute(
            "INSERT INTO credential (user_id, access_token, refresh_token, token_uri, client_id, client_secret, scopes, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id) DO UPDATE SET
               access_token = excluded.access_token,
               refresh_token = COALESCE(excluded.refresh_token, credential.refresh_token),
               token_uri = excluded.token_uri,
               client_id = excluded.client_id,
               client_secret = excluded.client_secret,
               scopes = excluded.scopes,
               expires_at = excluded.expires_at",
            tokio_rusqlite::params![
                user_id,
                credential.access_token,
                credential.refresh_token,
                credential.token_uri,
                credential.client_id,
                credential.client_secret,
                credential.scopes_str(),
                credential.expires_at,
            ],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub async fn find_credential(db: &Connection, user_id: i64) -> Result<Option<Credential>, Error> {
    let credential = db
        .call(move |conn| {
            let credential = conn
                .query_row(
                    r"
                    SELECT access_token, refresh_token, token_uri, client_id, client_secret, scopes, expires_at
                    FROM credential
                    WHERE user_id = ?
                    ",
                    [user_id],
                    |row| {
                        let scopes: String = row.get(5)?;
                        Ok(Credential {
                            access_token: row.get(0)?,
                            refresh_token: row.get(1)?,
                            token_uri: row.get(2)?,
                            client_id: row.get(3)?,
                            client_secret: row.get(4)?,
                            scopes: Credential::parse_scopes(&scopes),
                            expires_at: row.get(6)?,
                        })
                    },
                )
                .optional()?;
            Ok(credential)
        })
        .await?;
    Ok(credential)
}
