use serde::{Deserialize, Serialize};

/// Snapshot of the live store as read by introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Database engine identifier (always `sqlite` today).
    pub engine: String,
    /// Tables (and optionally views) ordered by name.
    pub tables: Vec<TableSnapshot>,
    /// SHA-256 over the sorted table and column names.
    pub fingerprint: Option<String>,
}

impl StoreSnapshot {
    pub fn table(&self, name: &str) -> Option<&TableSnapshot> {
        self.tables.iter().find(|table| table.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|table| table.kind == TableKind::Table)
            .map(|table| table.name.as_str())
            .collect()
    }
}

/// Kind of object captured from `sqlite_master`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Table,
    View,
}

/// Table-like object with its columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<ColumnSnapshot>,
    pub foreign_keys: Vec<ForeignKeySnapshot>,
}

impl TableSnapshot {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }
}

/// Column metadata as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSnapshot {
    pub position: i64,
    pub name: String,
    pub declared_type: String,
    pub not_null: bool,
    pub default: Option<String>,
    /// 1-based position inside the primary key, 0 when not part of it.
    pub primary_key_position: i64,
}

/// Foreign key as reported by `pragma_foreign_key_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeySnapshot {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
}
