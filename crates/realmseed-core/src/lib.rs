//! Core contracts and helpers for Realmseed.
//!
//! This crate defines the typed game-state catalog (the single source of
//! truth for the store layout), the domain vocabularies shared by the
//! generator and the validation harness, and the snapshot types that
//! introspection fills in.

pub mod catalog;
pub mod error;
pub mod snapshot;
pub mod types;
pub mod validation;

pub use catalog::{
    CATALOG, ColumnDef, ForeignKeyDef, REFERENCE_DATA, SqlType, TableDef, builtin_init_script,
    expected_tables, render_ddl, tables,
};
pub use error::{Error, Result};
pub use snapshot::{ColumnSnapshot, ForeignKeySnapshot, StoreSnapshot, TableKind, TableSnapshot};
pub use types::{
    Band, BattleResult, BattleType, CharacterClass, EquipmentSlot, ItemType, LevelStatus,
    LevelType, LogCategory, LogLevel, QuestStatus, QuestType, Rarity, StatBands,
};
pub use validation::{ContractReport, validate_catalog, verify_store_contract};

/// Current version of the catalog; recorded in `database_version`.
pub const CATALOG_VERSION: i64 = 1;
