use std::fs;

use anyhow::{Result, anyhow};

use crate::core::db::{async_db, initialize_db};

pub async fn run(db: bool, db_path: &str) -> Result<()> {
    if !db {
        return Err(anyhow!("Missing value for init \"--db\""));
    }

    println!("Initializing db...");
    fs::create_dir_all(db_path)?;
    let db = async_db(db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    println!("Finished initializing db");

    Ok(())
}
