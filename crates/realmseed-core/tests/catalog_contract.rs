use realmseed_core::{
    CATALOG, ColumnSnapshot, Error, StoreSnapshot, TableKind, TableSnapshot, tables,
    validate_catalog, verify_store_contract,
};

fn snapshot_from_catalog() -> StoreSnapshot {
    let tables = CATALOG
        .iter()
        .map(|table| TableSnapshot {
            name: table.name.to_string(),
            kind: TableKind::Table,
            columns: table
                .columns
                .iter()
                .enumerate()
                .map(|(idx, column)| ColumnSnapshot {
                    position: idx as i64,
                    name: column.name.to_string(),
                    declared_type: column.sql_type.as_sql().to_string(),
                    not_null: !column.nullable,
                    default: column.default.map(str::to_string),
                    primary_key_position: 0,
                })
                .collect(),
            foreign_keys: Vec::new(),
        })
        .collect();

    StoreSnapshot {
        engine: "sqlite".to_string(),
        tables,
        fingerprint: None,
    }
}

#[test]
fn builtin_catalog_is_consistent() {
    validate_catalog(CATALOG).expect("catalog should validate");
}

#[test]
fn full_snapshot_satisfies_contract() {
    let report = verify_store_contract(CATALOG, &snapshot_from_catalog());
    assert!(report.is_satisfied(), "unexpected gaps: {report:?}");
}

#[test]
fn missing_table_and_column_are_reported() {
    let mut snapshot = snapshot_from_catalog();
    snapshot.tables.retain(|table| table.name != tables::SAVE_DATA);
    if let Some(characters) = snapshot
        .tables
        .iter_mut()
        .find(|table| table.name == tables::CHARACTERS)
    {
        characters.columns.retain(|column| column.name != "is_player");
    }

    let report = verify_store_contract(CATALOG, &snapshot);
    assert_eq!(report.missing_tables, vec!["save_data".to_string()]);
    assert_eq!(report.missing_columns, vec!["characters.is_player".to_string()]);

    let err = report.into_result().expect_err("contract should fail");
    assert!(matches!(err, Error::Contract(message) if message.contains("save_data")));
}
