use sha2::{Digest, Sha256};

use realmseed_core::{ColumnSnapshot, ForeignKeySnapshot, TableKind, TableSnapshot};

use crate::options::IntrospectOptions;
use crate::sqlite::queries::{RawColumn, RawForeignKey, RawTable};

pub fn map_tables(raw: Vec<RawTable>, opts: &IntrospectOptions) -> Vec<TableSnapshot> {
    raw.into_iter()
        .filter(|table| opts.include_system_tables || !is_system_table(&table.name))
        .filter_map(|table| {
            let kind = match table.kind.as_str() {
                "table" => TableKind::Table,
                "view" if opts.include_views => TableKind::View,
                _ => return None,
            };
            Some(TableSnapshot {
                name: table.name,
                kind,
                columns: Vec::new(),
                foreign_keys: Vec::new(),
            })
        })
        .collect()
}

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnSnapshot> {
    raw.into_iter()
        .map(|column| ColumnSnapshot {
            position: column.cid,
            name: column.name,
            declared_type: column.declared_type.to_uppercase(),
            not_null: column.not_null != 0,
            default: column.dflt_value,
            primary_key_position: column.pk,
        })
        .collect()
}

pub fn map_foreign_keys(raw: Vec<RawForeignKey>) -> Vec<ForeignKeySnapshot> {
    raw.into_iter()
        .map(|key| ForeignKeySnapshot {
            column: key.column,
            referenced_table: key.referenced_table,
            // SQLite leaves `to` empty when the parent primary key is implied.
            referenced_column: key.referenced_column.unwrap_or_default(),
        })
        .collect()
}

/// Stable digest of the table and column layout.
pub fn fingerprint(tables: &[TableSnapshot]) -> String {
    let mut entries: Vec<String> = tables
        .iter()
        .map(|table| {
            let mut columns: Vec<&str> = table
                .columns
                .iter()
                .map(|column| column.name.as_str())
                .collect();
            columns.sort_unstable();
            format!("{}({})", table.name, columns.join(","))
        })
        .collect();
    entries.sort();

    let mut hasher = Sha256::new();
    for entry in &entries {
        hasher.update(entry.as_bytes());
        hasher.update(b";");
    }
    hex::encode(hasher.finalize())
}

fn is_system_table(name: &str) -> bool {
    name.starts_with("sqlite_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, kind: &str) -> RawTable {
        RawTable {
            name: name.to_string(),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn hides_system_tables_and_views_by_default() {
        let tables = map_tables(
            vec![
                raw("characters", "table"),
                raw("sqlite_sequence", "table"),
                raw("player_summary", "view"),
            ],
            &IntrospectOptions::default(),
        );
        let names: Vec<&str> = tables.iter().map(|table| table.name.as_str()).collect();
        assert_eq!(names, vec!["characters"]);
    }

    #[test]
    fn fingerprint_ignores_ordering() {
        let a = map_tables(
            vec![raw("quests", "table"), raw("levels", "table")],
            &IntrospectOptions::default(),
        );
        let mut b = a.clone();
        b.reverse();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }
}
