use sqlx::SqliteConnection;

use realmseed_core::Result;

fn db_error(err: sqlx::Error) -> realmseed_core::Error {
    realmseed_core::Error::Db(err.to_string())
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawTable {
    pub name: String,
    #[sqlx(rename = "type")]
    pub kind: String,
}

pub async fn list_tables(conn: &mut SqliteConnection) -> Result<Vec<RawTable>> {
    sqlx::query_as::<_, RawTable>(
        r#"
        select name, type
        from sqlite_master
        where type in ('table', 'view')
        order by name
        "#,
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawColumn {
    pub cid: i64,
    pub name: String,
    #[sqlx(rename = "type")]
    pub declared_type: String,
    #[sqlx(rename = "notnull")]
    pub not_null: i64,
    pub dflt_value: Option<String>,
    pub pk: i64,
}

pub async fn list_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<RawColumn>> {
    sqlx::query_as::<_, RawColumn>(
        r#"
        select cid, name, type, "notnull", dflt_value, pk
        from pragma_table_info(?1)
        order by cid
        "#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)
}

#[derive(Debug, sqlx::FromRow)]
pub struct RawForeignKey {
    #[sqlx(rename = "from")]
    pub column: String,
    #[sqlx(rename = "table")]
    pub referenced_table: String,
    #[sqlx(rename = "to")]
    pub referenced_column: Option<String>,
}

pub async fn list_foreign_keys(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Vec<RawForeignKey>> {
    sqlx::query_as::<_, RawForeignKey>(
        r#"
        select "from", "table", "to"
        from pragma_foreign_key_list(?1)
        order by id, seq
        "#,
    )
    .bind(table)
    .fetch_all(&mut *conn)
    .await
    .map_err(db_error)
}
