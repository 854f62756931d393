use anyhow::Result;
use kindred::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
