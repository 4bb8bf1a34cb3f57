use std::path::Path;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, SqliteConnection};
use tracing::info;

use crate::errors::GenerationError;

/// How a store file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-write; the file is created when missing.
    Create,
    /// Read-only; the file must already exist.
    ReadOnly,
}

/// Open the single connection a run works through, with foreign keys on.
pub async fn open_store(path: &Path, mode: OpenMode) -> Result<SqliteConnection, GenerationError> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .foreign_keys(true)
        .create_if_missing(mode == OpenMode::Create)
        .read_only(mode == OpenMode::ReadOnly);

    options.connect().await.map_err(|err| {
        GenerationError::Connection(format!("{}: {err}", path.display()))
    })
}

/// Apply a schema-creation script as one transaction.
pub async fn apply_script(conn: &mut SqliteConnection, script: &str) -> Result<(), GenerationError> {
    let mut tx = conn
        .begin()
        .await
        .map_err(|err| GenerationError::Script(err.to_string()))?;
    sqlx::raw_sql(script)
        .execute(&mut *tx)
        .await
        .map_err(|err| GenerationError::Script(err.to_string()))?;
    tx.commit()
        .await
        .map_err(|err| GenerationError::Script(err.to_string()))?;

    info!(event = "script_applied", bytes = script.len());
    Ok(())
}
