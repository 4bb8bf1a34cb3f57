use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::TableDef;
use crate::error::{Error, Result};
use crate::snapshot::StoreSnapshot;

/// Validate internal consistency of a table catalog.
///
/// This checks:
/// - duplicate tables/columns
/// - primary key columns exist
/// - foreign key columns and referenced targets exist
pub fn validate_catalog(catalog: &[TableDef]) -> Result<()> {
    let mut index: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for table in catalog {
        if index.contains_key(table.name) {
            return Err(Error::InvalidCatalog(format!(
                "duplicate table name: {}",
                table.name
            )));
        }

        let mut columns = BTreeSet::new();
        for column in table.columns {
            if !columns.insert(column.name) {
                return Err(Error::InvalidCatalog(format!(
                    "duplicate column name: {}.{}",
                    table.name, column.name
                )));
            }
        }

        index.insert(table.name, columns);
    }

    for table in catalog {
        let columns = index.get(table.name).ok_or_else(|| {
            Error::InvalidCatalog(format!("missing table in index: {}", table.name))
        })?;

        let auto_ids = table
            .columns
            .iter()
            .filter(|column| column.auto_increment)
            .count();
        if auto_ids > 1 || (auto_ids == 1 && !table.primary_key.is_empty()) {
            return Err(Error::InvalidCatalog(format!(
                "table {} declares more than one primary key",
                table.name
            )));
        }
        if auto_ids == 0 && table.primary_key.is_empty() {
            return Err(Error::InvalidCatalog(format!(
                "table {} has no primary key",
                table.name
            )));
        }

        for column in table.primary_key {
            if !columns.contains(column) {
                return Err(Error::InvalidCatalog(format!(
                    "primary key column not found: {}.{}",
                    table.name, column
                )));
            }
        }

        for key in table.foreign_keys {
            for column in key.columns {
                if !columns.contains(column) {
                    return Err(Error::InvalidCatalog(format!(
                        "foreign key column not found: {}.{}",
                        table.name, column
                    )));
                }
            }

            let referenced = index.get(key.table).ok_or_else(|| {
                Error::InvalidCatalog(format!("referenced table not found: {}", key.table))
            })?;

            for column in key.references {
                if !referenced.contains(column) {
                    return Err(Error::InvalidCatalog(format!(
                        "referenced column not found: {}.{}",
                        key.table, column
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Differences between the catalog and a live store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractReport {
    pub missing_tables: Vec<String>,
    /// `table.column` entries.
    pub missing_columns: Vec<String>,
}

impl ContractReport {
    pub fn is_satisfied(&self) -> bool {
        self.missing_tables.is_empty() && self.missing_columns.is_empty()
    }

    /// Convert an unsatisfied report into an error.
    pub fn into_result(self) -> Result<()> {
        if self.is_satisfied() {
            return Ok(());
        }
        let mut parts = Vec::new();
        if !self.missing_tables.is_empty() {
            parts.push(format!("missing tables: {}", self.missing_tables.join(", ")));
        }
        if !self.missing_columns.is_empty() {
            parts.push(format!(
                "missing columns: {}",
                self.missing_columns.join(", ")
            ));
        }
        Err(Error::Contract(parts.join("; ")))
    }
}

/// Compare a live store snapshot against the catalog.
///
/// Extra tables and columns are tolerated; only absences are reported.
pub fn verify_store_contract(catalog: &[TableDef], snapshot: &StoreSnapshot) -> ContractReport {
    let mut report = ContractReport::default();

    for table in catalog {
        let Some(live) = snapshot.table(table.name) else {
            report.missing_tables.push(table.name.to_string());
            continue;
        };
        for column in table.column_names() {
            if !live.has_column(column) {
                report
                    .missing_columns
                    .push(format!("{}.{}", table.name, column));
            }
        }
    }

    report
}
