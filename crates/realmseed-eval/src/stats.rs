use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use realmseed_core::{CATALOG, tables};
use realmseed_introspect::introspect_sqlite;

use crate::errors::EvalError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    /// `None` when the table is absent from the store.
    pub rows: Option<i64>,
}

/// Value counts for one categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub label: String,
    pub values: Vec<(String, i64)>,
}

/// Read-only summary of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub tables: Vec<TableCount>,
    pub distributions: Vec<Distribution>,
}

impl StoreStats {
    pub fn rows(&self, table: &str) -> Option<i64> {
        self.tables
            .iter()
            .find(|count| count.table == table)
            .and_then(|count| count.rows)
    }
}

const DISTRIBUTIONS: &[(&str, &str, &str)] = &[
    ("character classes", tables::CHARACTERS, "class"),
    ("quest types", tables::QUESTS, "type"),
    ("level types", tables::LEVELS, "type"),
    ("battle results", tables::BATTLE_RECORDS, "result"),
];

/// Row counts for every catalog table plus the categorical distributions.
pub async fn collect_stats(conn: &mut SqliteConnection) -> Result<StoreStats, EvalError> {
    let snapshot = introspect_sqlite(conn).await?;
    let present: BTreeSet<String> = snapshot
        .table_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut counts = Vec::with_capacity(CATALOG.len());
    for table in CATALOG {
        let rows = if present.contains(table.name) {
            let rows: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table.name))
                .fetch_one(&mut *conn)
                .await
                .map_err(|err| EvalError::Db(err.to_string()))?;
            Some(rows)
        } else {
            None
        };
        counts.push(TableCount {
            table: table.name.to_string(),
            rows,
        });
    }

    let mut distributions = Vec::new();
    for (label, table, column) in DISTRIBUTIONS {
        if !present.contains(*table) {
            continue;
        }
        let values: Vec<(String, i64)> = sqlx::query_as(&format!(
            "SELECT {column}, COUNT(*) FROM {table} GROUP BY {column} ORDER BY {column}"
        ))
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| EvalError::Db(err.to_string()))?;
        distributions.push(Distribution {
            label: label.to_string(),
            values,
        });
    }

    Ok(StoreStats {
        tables: counts,
        distributions,
    })
}
