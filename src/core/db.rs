use std::path::Path;

use anyhow::Result;
use rusqlite::Connection as SyncConnection;
use tokio_rusqlite::Connection;

const DB_FILE_NAME: &str = "kindred.db";

/// Columns added to `person` after the first release. `migrate_db`
/// adds any that an older database is missing.
const PERSON_COLUMNS: &[(&str, &str)] = &[
    ("anniversary", "TEXT"),
    ("anniversary_title", "TEXT"),
    ("relationship", "TEXT"),
    ("allergies", "TEXT"),
    ("likes", "TEXT"),
    ("dislikes", "TEXT"),
];

/// Open the database stored in the `db_dir` directory.
pub async fn async_db(db_dir: &str) -> Result<Connection> {
    let path = Path::new(db_dir).join(DB_FILE_NAME);
    let db = Connection::open(path).await?;
    enable_foreign_keys(&db).await?;
    Ok(db)
}

pub async fn enable_foreign_keys(db: &Connection) -> Result<()> {
    db.call(|conn| {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(())
    })
    .await?;
    Ok(())
}

pub fn initialize_db(conn: &SyncConnection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS session (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS oauth_state (
            state TEXT PRIMARY KEY,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS credential (
            user_id INTEGER PRIMARY KEY REFERENCES user(id) ON DELETE CASCADE,
            access_token TEXT NOT NULL,
            refresh_token TEXT,
            token_uri TEXT NOT NULL,
            client_id TEXT NOT NULL,
            client_secret TEXT NOT NULL,
            scopes TEXT NOT NULL,
            expires_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS person_group (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            group_name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS person (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            birthday TEXT,
            anniversary TEXT,
            anniversary_title TEXT,
            relationship TEXT,
            allergies TEXT,
            likes TEXT,
            dislikes TEXT
        );

        CREATE TABLE IF NOT EXISTS group_member (
            person_id INTEGER NOT NULL REFERENCES person(id) ON DELETE CASCADE,
            group_id INTEGER NOT NULL REFERENCES person_group(id) ON DELETE CASCADE,
            PRIMARY KEY (person_id, group_id)
        );

        CREATE INDEX IF NOT EXISTS person_user_idx ON person(user_id);
        CREATE INDEX IF NOT EXISTS person_group_user_idx ON person_group(user_id);
        ",
    )
}

/// Bring an existing database up to the current schema. Safe to run
/// repeatedly.
pub fn migrate_db(conn: &SyncConnection) -> rusqlite::Result<()> {
    initialize_db(conn)?;

    let existing = {
        let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('person')")?;
        stmt.query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?
    };

    for (column, sql_type) in PERSON_COLUMNS {
        if !existing.iter().any(|c| c == column) {
            tracing::info!("Adding missing column person.{}", column);
            conn.execute(
                &format!("ALTER TABLE person ADD COLUMN {} {}", column, sql_type),
                [],
            )?;
        }
    }

    Ok(())
}
