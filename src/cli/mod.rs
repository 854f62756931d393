use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::AppConfig;

pub mod auth;
pub mod init;
pub mod migrate;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Create the database
    Init {
        #[arg(long, action, default_value = "false")]
        db: bool,
    },
    /// Migrate the db schema
    Migrate {
        #[arg(long, action, default_value = "false")]
        db: bool,
    },
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "3000")]
        port: String,
    },
    /// Connect a Google account and print a session token
    Auth {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    let storage_path = env::var("KINDRED_STORAGE_PATH").unwrap_or("./".to_string());
    let db_path = format!("{}/db", storage_path);

    // Handle each sub command
    match args.command {
        Some(Command::Init { db }) => {
            init::run(db, &db_path).await?;
        }
        Some(Command::Migrate { db }) => {
            init_tracing();
            migrate::run(db, &db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Auth {}) => {
            init_tracing();
            auth::run(AppConfig::default()).await?;
        }
        None => {}
    }

    Ok(())
}
