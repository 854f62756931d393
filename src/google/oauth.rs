//! Google OAuth2 authorization-code flow and token refresh

use anyhow::{Error, Result};
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use crate::accounts::Credential;
use crate::reminders::CalendarError;

/// Sign-in identity plus read/write access to the user's calendars
pub const SCOPES: &[&str] = &[
    "openid",
    "email",
    "profile",
    "https://www.googleapis.com/auth/calendar",
];

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

impl TokenResponse {
    pub fn into_credential(self, token_uri: &str, client_id: &str, client_secret: &str) -> Credential {
        let scopes = self
            .scope
            .as_deref()
            .map(Credential::parse_scopes)
            .unwrap_or_else(|| SCOPES.iter().map(|s| s.to_string()).collect());
        Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_uri: token_uri.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            scopes,
            expires_at: self.expires_in.map(|secs| Utc::now().timestamp() + secs),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserInfo {
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
}

impl UserInfo {
    /// The email address, only when Google has verified it.
    pub fn verified_email(&self) -> Option<&str> {
        match self.email_verified {
            Some(true) => self.email.as_deref(),
            _ => None,
        }
    }
}

/// URL of the consent screen. `access_type=offline` and
/// `prompt=consent` make Google return a refresh token every time.
pub fn authorization_url(
    accounts_hostname: &str,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
) -> String {
    format!(
        "{}/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&include_granted_scopes=true&state={}",
        accounts_hostname,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&SCOPES.join(" ")),
        urlencoding::encode(state),
    )
}

pub async fn exchange_code_for_token(
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse, Error> {
    let res = Client::new()
        .post(token_url)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Token exchange failed: {} ({})", status, text);
    }
    let token: TokenResponse = serde_json::from_str(&text)?;
    Ok(token)
}

/// Trade the refresh token for a new access token. The returned
/// credential keeps the old refresh token unless Google rotated it.
pub async fn refresh_access_token(credential: &Credential) -> Result<Credential, CalendarError> {
    let Some(refresh_token) = credential.refresh_token.as_deref() else {
        return Err(CalendarError::StaleOrMissingCredential(
            "access token expired and no refresh token is stored".to_string(),
        ));
    };

    let res = Client::new()
        .post(&credential.token_uri)
        .form(&[
            ("client_id", credential.client_id.as_str()),
            ("client_secret", credential.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();

    if status.as_u16() == 400 || status.as_u16() == 401 {
        // invalid_grant: revoked or expired refresh token
        return Err(CalendarError::StaleOrMissingCredential(format!(
            "token refresh rejected: {} ({})",
            status, text
        )));
    }
    if !status.is_success() {
        return Err(CalendarError::ProviderUnavailable(format!(
            "token refresh failed: {} ({})",
            status, text
        )));
    }

    let token: TokenResponse = serde_json::from_str(&text)
        .map_err(|e| CalendarError::ProviderUnavailable(format!("bad token response: {}", e)))?;
    let mut refreshed =
        token.into_credential(&credential.token_uri, &credential.client_id, &credential.client_secret);
    if refreshed.refresh_token.is_none() {
        refreshed.refresh_token = credential.refresh_token.clone();
    }
    if refreshed.scopes.is_empty() {
        refreshed.scopes = credential.scopes.clone();
    }
    tracing::debug!("Refreshed calendar access token");
    Ok(refreshed)
}

pub async fn fetch_userinfo(userinfo_url: &str, access_token: &str) -> Result<UserInfo, Error> {
    let res = Client::new()
        .get(userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Userinfo fetch failed: {} ({})", status, text);
    }
    let info: UserInfo = serde_json::from_str(&text)?;
    Ok(info)
}
