use std::io::{self, Write};

use anyhow::{Result, anyhow};
use uuid::Uuid;

use crate::accounts::{create_session, save_credential, upsert_user};
use crate::core::AppConfig;
use crate::core::db::async_db;
use crate::google::oauth::{authorization_url, exchange_code_for_token, fetch_userinfo};

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_owned())
}

/// Connect a Google account from the terminal: open the consent URL,
/// paste the `code` parameter Google redirects back with, and get a
/// session token for the API.
pub async fn run(config: AppConfig) -> Result<()> {
    let state = Uuid::new_v4().to_string();
    let auth_url = authorization_url(
        &config.google_accounts_hostname,
        &config.google_client_id,
        &config.google_redirect_uri,
        &state,
    );
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    println!(
        "Google redirects to {} afterwards. Copy the `code` query parameter from that URL.\n",
        config.google_redirect_uri
    );
    let code = prompt("Paste the authorization code here: ")?;
    if code.is_empty() {
        return Err(anyhow!("No authorization code entered"));
    }
    let code = urlencoding::decode(&code)?.into_owned();

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
        .ok_or_else(|| anyhow!("Google account email is not verified"))?
        .to_string();
    let username = info.name.clone().unwrap_or_else(|| email.clone());
    if token.refresh_token.is_none() {
        tracing::warn!("Google did not return a refresh token, calendar access will expire");
    }

    std::fs::create_dir_all(&config.db_path)?;
    let db = async_db(&config.db_path).await?;
    let user = upsert_user(&db, &username, &email).await?;
    let credential = token.into_credential(
        &token_url,
        &config.google_client_id,
        &config.google_client_secret,
    );
    save_credential(&db, user.id, &credential).await?;
    let session_token = create_session(&db, user.id).await?;

    println!("Calendar connected for {}.", email);
    println!("Session token: {}", session_token);
    Ok(())
}
