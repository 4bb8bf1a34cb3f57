use sqlx::SqliteConnection;

use realmseed_core::{Result, StoreSnapshot};

use crate::adapter::Adapter;
use crate::options::IntrospectOptions;

mod mapper;
mod queries;

/// Adapter for SQLite stores over a single exclusively-held connection.
#[derive(Debug)]
pub struct SqliteAdapter<'c> {
    conn: &'c mut SqliteConnection,
}

impl<'c> SqliteAdapter<'c> {
    pub fn new(conn: &'c mut SqliteConnection) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<'c> Adapter for SqliteAdapter<'c> {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    async fn introspect(&mut self, opts: &IntrospectOptions) -> Result<StoreSnapshot> {
        introspect(&mut *self.conn, opts).await
    }
}

/// Introspect SQLite with default options.
pub async fn introspect_sqlite(conn: &mut SqliteConnection) -> Result<StoreSnapshot> {
    introspect_sqlite_with_options(conn, IntrospectOptions::default()).await
}

/// Introspect SQLite with caller-provided options.
pub async fn introspect_sqlite_with_options(
    conn: &mut SqliteConnection,
    opts: IntrospectOptions,
) -> Result<StoreSnapshot> {
    introspect(conn, &opts).await
}

/// Introspect a SQLite store according to the provided options.
pub async fn introspect(
    conn: &mut SqliteConnection,
    opts: &IntrospectOptions,
) -> Result<StoreSnapshot> {
    let raw_tables = queries::list_tables(conn).await?;
    let mut tables = mapper::map_tables(raw_tables, opts);

    if opts.include_columns {
        for table in &mut tables {
            let raw_columns = queries::list_columns(conn, &table.name).await?;
            table.columns = mapper::map_columns(raw_columns);

            let raw_fks = queries::list_foreign_keys(conn, &table.name).await?;
            table.foreign_keys = mapper::map_foreign_keys(raw_fks);
        }
    }

    tables.sort_by(|left, right| left.name.cmp(&right.name));
    let fingerprint = mapper::fingerprint(&tables);

    Ok(StoreSnapshot {
        engine: "sqlite".to_string(),
        tables,
        fingerprint: Some(fingerprint),
    })
}
