//! Typed definition of the game-state store.
//!
//! Every table the generator writes and the harness expects is declared
//! here; the DDL applied by `init` is rendered from these definitions.

use crate::types::{
    BattleResult, BattleType, CharacterClass, EquipmentSlot, ItemType, LevelStatus, LevelType,
    LogCategory, LogLevel, QuestStatus, QuestType, Rarity,
};

/// Table names used across crates.
pub mod tables {
    pub const CHARACTERS: &str = "characters";
    pub const CHARACTER_ATTRIBUTES: &str = "character_attributes";
    pub const SKILLS: &str = "skills";
    pub const CHARACTER_SKILLS: &str = "character_skills";
    pub const EQUIPMENT: &str = "equipment";
    pub const CHARACTER_EQUIPMENT: &str = "character_equipment";
    pub const ITEMS: &str = "items";
    pub const CHARACTER_INVENTORY: &str = "character_inventory";
    pub const QUESTS: &str = "quests";
    pub const CHARACTER_QUESTS: &str = "character_quests";
    pub const LEVELS: &str = "levels";
    pub const CHARACTER_LEVEL_PROGRESS: &str = "character_level_progress";
    pub const BATTLE_RECORDS: &str = "battle_records";
    pub const STATUS_EFFECTS: &str = "status_effects";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const CHARACTER_ACHIEVEMENTS: &str = "character_achievements";
    pub const SAVE_DATA: &str = "save_data";
    pub const STATISTICS: &str = "statistics";
    pub const CONFIG: &str = "config";
    pub const GAME_LOGS: &str = "game_logs";
    pub const DATABASE_VERSION: &str = "database_version";
}

/// Reference rows (skills, equipment, items, achievements, config) applied
/// after the rendered DDL by the built-in init script.
pub const REFERENCE_DATA: &str = include_str!("../sql/reference_data.sql");

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
    Boolean,
    Timestamp,
}

impl SqlType {
    pub const fn as_sql(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Timestamp => "DATETIME",
        }
    }
}

/// Column definition.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub default: Option<&'static str>,
    /// Closed set of stored values, rendered as a CHECK constraint.
    pub allowed: &'static [&'static str],
    pub auto_increment: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            sql_type,
            nullable: false,
            default: None,
            allowed: &[],
            auto_increment: false,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub const fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.allowed = values;
        self
    }

    /// `INTEGER PRIMARY KEY AUTOINCREMENT` row id.
    pub const fn auto_id(name: &'static str) -> Self {
        let mut column = Self::new(name, SqlType::Integer);
        column.auto_increment = true;
        column
    }
}

/// Foreign key from one or more columns to a parent table.
#[derive(Debug, Clone, Copy)]
pub struct ForeignKeyDef {
    pub columns: &'static [&'static str],
    pub table: &'static str,
    pub references: &'static [&'static str],
}

const fn fk(
    column: &'static [&'static str],
    table: &'static str,
    references: &'static [&'static str],
) -> ForeignKeyDef {
    ForeignKeyDef {
        columns: column,
        table,
        references,
    }
}

/// Table definition.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    /// Empty when the table uses an auto-increment id column.
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKeyDef],
}

impl TableDef {
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|column| column.name)
    }
}

use ColumnDef as C;
use SqlType::{Boolean, Integer, Real, Text, Timestamp};

const CHARACTER_ID: &[&str] = &["character_id"];
const TO_CHARACTER: &[ForeignKeyDef] = &[fk(CHARACTER_ID, tables::CHARACTERS, &["id"])];

/// Every table in the store, parents before children.
pub const CATALOG: &[TableDef] = &[
    TableDef {
        name: tables::CHARACTERS,
        columns: &[
            C::new("id", Text),
            C::new("name", Text),
            C::new("class", Text).one_of(CharacterClass::NAMES),
            C::new("level", Integer).default_value("1"),
            C::new("experience", Integer).default_value("0"),
            C::new("health", Integer),
            C::new("max_health", Integer),
            C::new("mana", Integer),
            C::new("max_mana", Integer),
            C::new("attack", Integer),
            C::new("defense", Integer),
            C::new("speed", Integer).default_value("5"),
            C::new("critical_rate", Real).default_value("0.05"),
            C::new("critical_damage", Real).default_value("1.5"),
            C::new("is_player", Boolean).default_value("0"),
            C::new("created_at", Timestamp).default_value("CURRENT_TIMESTAMP"),
        ],
        primary_key: &["id"],
        foreign_keys: &[],
    },
    TableDef {
        name: tables::CHARACTER_ATTRIBUTES,
        columns: &[
            C::new("character_id", Text),
            C::new("attribute_key", Text),
            C::new("attribute_value", Real),
        ],
        primary_key: &["character_id", "attribute_key"],
        foreign_keys: TO_CHARACTER,
    },
    TableDef {
        name: tables::SKILLS,
        columns: &[
            C::new("id", Text),
            C::new("name", Text),
            C::new("description", Text).nullable(),
            C::new("class_requirement", Text).one_of(CharacterClass::NAMES),
            C::new("level_requirement", Integer).default_value("1"),
            C::new("mana_cost", Integer).default_value("0"),
            C::new("cooldown", Real).default_value("0"),
            C::new("damage", Integer).default_value("0"),
        ],
        primary_key: &["id"],
        foreign_keys: &[],
    },
    TableDef {
        name: tables::CHARACTER_SKILLS,
        columns: &[
            C::new("character_id", Text),
            C::new("skill_id", Text),
            C::new("skill_level", Integer).default_value("1"),
            C::new("is_equipped", Boolean).default_value("0"),
        ],
        primary_key: &["character_id", "skill_id"],
        foreign_keys: &[
            fk(CHARACTER_ID, tables::CHARACTERS, &["id"]),
            fk(&["skill_id"], tables::SKILLS, &["id"]),
        ],
    },
    TableDef {
        name: tables::EQUIPMENT,
        columns: &[
            C::new("id", Text),
            C::new("name", Text),
            C::new("slot", Text).one_of(EquipmentSlot::NAMES),
            C::new("rarity", Text).one_of(Rarity::NAMES).default_value("'common'"),
            C::new("level_requirement", Integer).default_value("1"),
            C::new("class_requirement", Text)
                .nullable()
                .one_of(CharacterClass::NAMES),
            C::new("attack_bonus", Integer).default_value("0"),
            C::new("defense_bonus", Integer).default_value("0"),
        ],
        primary_key: &["id"],
        foreign_keys: &[],
    },
    TableDef {
        name: tables::CHARACTER_EQUIPMENT,
        columns: &[
            C::new("character_id", Text),
            C::new("equipment_id", Text),
            C::new("slot", Text).one_of(EquipmentSlot::NAMES),
            C::new("is_equipped", Boolean).default_value("1"),
            C::new("durability", Integer).default_value("100"),
            C::new("enchant_level", Integer).default_value("0"),
        ],
        primary_key: &["character_id", "slot"],
        foreign_keys: &[
            fk(CHARACTER_ID, tables::CHARACTERS, &["id"]),
            fk(&["equipment_id"], tables::EQUIPMENT, &["id"]),
        ],
    },
    TableDef {
        name: tables::ITEMS,
        columns: &[
            C::new("id", Text),
            C::new("name", Text),
            C::new("type", Text).one_of(ItemType::NAMES),
            C::new("rarity", Text).one_of(Rarity::NAMES).default_value("'common'"),
            C::new("stack_limit", Integer).default_value("99"),
            C::new("value", Integer).default_value("0"),
        ],
        primary_key: &["id"],
        foreign_keys: &[],
    },
    TableDef {
        name: tables::CHARACTER_INVENTORY,
        columns: &[
            C::new("character_id", Text),
            C::new("item_id", Text),
            C::new("quantity", Integer).default_value("1"),
            C::new("slot_index", Integer),
        ],
        primary_key: &["character_id", "slot_index"],
        foreign_keys: &[
            fk(CHARACTER_ID, tables::CHARACTERS, &["id"]),
            fk(&["item_id"], tables::ITEMS, &["id"]),
        ],
    },
    TableDef {
        name: tables::QUESTS,
        columns: &[
            C::new("id", Text),
            C::new("title", Text),
            C::new("description", Text),
            C::new("type", Text).one_of(QuestType::NAMES),
            C::new("chapter", Integer).default_value("1"),
            C::new("level_requirement", Integer).default_value("1"),
            C::new("objectives", Text).default_value("'[]'"),
            C::new("rewards", Text).default_value("'{}'"),
        ],
        primary_key: &["id"],
        foreign_keys: &[],
    },
    TableDef {
        name: tables::CHARACTER_QUESTS,
        columns: &[
            C::new("character_id", Text),
            C::new("quest_id", Text),
            C::new("status", Text).one_of(QuestStatus::NAMES),
            C::new("progress", Text).default_value("'{}'"),
            C::new("start_time", Timestamp).nullable(),
            C::new("complete_time", Timestamp).nullable(),
        ],
        primary_key: &["character_id", "quest_id"],
        foreign_keys: &[
            fk(CHARACTER_ID, tables::CHARACTERS, &["id"]),
            fk(&["quest_id"], tables::QUESTS, &["id"]),
        ],
    },
    TableDef {
        name: tables::LEVELS,
        columns: &[
            C::new("id", Text),
            C::new("name", Text),
            C::new("description", Text),
            C::new("type", Text).one_of(LevelType::NAMES),
            C::new("chapter", Integer).default_value("1"),
            C::new("difficulty", Real).default_value("1.0"),
            C::new("level_requirement", Integer).default_value("1"),
            C::new("enemies", Text).default_value("'[]'"),
            C::new("rewards", Text).default_value("'{}'"),
        ],
        primary_key: &["id"],
        foreign_keys: &[],
    },
    TableDef {
        name: tables::CHARACTER_LEVEL_PROGRESS,
        columns: &[
            C::new("character_id", Text),
            C::new("level_id", Text),
            C::new("status", Text).one_of(LevelStatus::NAMES),
            C::new("completion_time", Integer).default_value("0"),
            C::new("score", Integer).default_value("0"),
            C::new("stars", Integer).default_value("0"),
            C::new("attempts", Integer).default_value("0"),
            C::new("best_time", Integer).default_value("0"),
        ],
        primary_key: &["character_id", "level_id"],
        foreign_keys: &[
            fk(CHARACTER_ID, tables::CHARACTERS, &["id"]),
            fk(&["level_id"], tables::LEVELS, &["id"]),
        ],
    },
    TableDef {
        name: tables::BATTLE_RECORDS,
        columns: &[
            C::auto_id("id"),
            C::new("character_id", Text),
            C::new("level_id", Text).nullable(),
            C::new("battle_type", Text).one_of(BattleType::NAMES),
            C::new("opponent_type", Text),
            C::new("result", Text).one_of(BattleResult::NAMES),
            C::new("duration", Integer),
            C::new("damage_dealt", Integer),
            C::new("damage_taken", Integer),
            C::new("skills_used", Text).default_value("'[]'"),
            C::new("combo_max", Integer).default_value("0"),
            C::new("experience_gained", Integer).default_value("0"),
            C::new("items_dropped", Text).default_value("'[]'"),
            C::new("battle_time", Timestamp).default_value("CURRENT_TIMESTAMP"),
        ],
        primary_key: &[],
        foreign_keys: &[
            fk(CHARACTER_ID, tables::CHARACTERS, &["id"]),
            fk(&["level_id"], tables::LEVELS, &["id"]),
        ],
    },
    TableDef {
        name: tables::STATUS_EFFECTS,
        columns: &[
            C::auto_id("id"),
            C::new("character_id", Text),
            C::new("effect_type", Text),
            C::new("magnitude", Real).default_value("0"),
            C::new("duration", Integer).default_value("0"),
            C::new("applied_at", Timestamp).default_value("CURRENT_TIMESTAMP"),
        ],
        primary_key: &[],
        foreign_keys: TO_CHARACTER,
    },
    TableDef {
        name: tables::ACHIEVEMENTS,
        columns: &[
            C::new("id", Text),
            C::new("name", Text),
            C::new("description", Text).nullable(),
            C::new("category", Text).default_value("'general'"),
            C::new("condition_data", Text).default_value("'{}'"),
            C::new("reward_data", Text).default_value("'{}'"),
        ],
        primary_key: &["id"],
        foreign_keys: &[],
    },
    TableDef {
        name: tables::CHARACTER_ACHIEVEMENTS,
        columns: &[
            C::new("character_id", Text),
            C::new("achievement_id", Text),
            C::new("unlocked", Boolean).default_value("0"),
            C::new("unlock_date", Timestamp).nullable(),
            C::new("progress", Text).default_value("'{}'"),
        ],
        primary_key: &["character_id", "achievement_id"],
        foreign_keys: &[
            fk(CHARACTER_ID, tables::CHARACTERS, &["id"]),
            fk(&["achievement_id"], tables::ACHIEVEMENTS, &["id"]),
        ],
    },
    TableDef {
        name: tables::SAVE_DATA,
        columns: &[
            C::new("slot_id", Text),
            C::new("player_name", Text),
            C::new("character_id", Text),
            C::new("chapter", Integer).default_value("1"),
            C::new("play_time", Integer).default_value("0"),
            C::new("game_data", Text).default_value("'{}'"),
            C::new("settings_data", Text).default_value("'{}'"),
            C::new("save_date", Timestamp).default_value("CURRENT_TIMESTAMP"),
        ],
        primary_key: &["slot_id"],
        foreign_keys: TO_CHARACTER,
    },
    TableDef {
        name: tables::STATISTICS,
        columns: &[
            C::new("character_id", Text),
            C::new("stat_key", Text),
            C::new("stat_value", Integer).default_value("0"),
            C::new("stat_type", Text).default_value("'integer'"),
        ],
        primary_key: &["character_id", "stat_key"],
        foreign_keys: TO_CHARACTER,
    },
    TableDef {
        name: tables::CONFIG,
        columns: &[
            C::new("key", Text),
            C::new("value", Text).nullable(),
            C::new("type", Text).default_value("'string'"),
            C::new("description", Text).nullable(),
        ],
        primary_key: &["key"],
        foreign_keys: &[],
    },
    TableDef {
        name: tables::GAME_LOGS,
        columns: &[
            C::auto_id("id"),
            C::new("character_id", Text).nullable(),
            C::new("log_level", Text).one_of(LogLevel::NAMES),
            C::new("log_category", Text).one_of(LogCategory::NAMES),
            C::new("message", Text),
            C::new("data", Text).default_value("'{}'"),
            C::new("created_at", Timestamp).default_value("CURRENT_TIMESTAMP"),
        ],
        primary_key: &[],
        foreign_keys: TO_CHARACTER,
    },
    TableDef {
        name: tables::DATABASE_VERSION,
        columns: &[
            C::new("version", Integer),
            C::new("description", Text).nullable(),
            C::new("applied_at", Timestamp).default_value("CURRENT_TIMESTAMP"),
        ],
        primary_key: &["version"],
        foreign_keys: &[],
    },
];

/// Names of every table the store is expected to hold.
pub fn expected_tables() -> Vec<&'static str> {
    CATALOG.iter().map(|table| table.name).collect()
}

/// Render `CREATE TABLE` statements for the whole catalog.
///
/// Statements are not guarded with `IF NOT EXISTS`: applying them to an
/// initialised store fails instead of silently merging layouts.
pub fn render_ddl() -> String {
    let mut out = String::new();
    for table in CATALOG {
        out.push_str(&render_table(table));
        out.push('\n');
    }
    out
}

/// Rendered DDL followed by the bundled reference data.
pub fn builtin_init_script() -> String {
    let mut script = render_ddl();
    script.push('\n');
    script.push_str(REFERENCE_DATA);
    script.push_str(&format!(
        "\nINSERT INTO database_version (version, description) VALUES ({}, 'initial catalog');\n",
        crate::CATALOG_VERSION
    ));
    script
}

fn render_table(table: &TableDef) -> String {
    let mut lines = Vec::new();
    for column in table.columns {
        lines.push(format!("  {}", render_column(column)));
    }
    if !table.primary_key.is_empty() {
        lines.push(format!("  PRIMARY KEY ({})", table.primary_key.join(", ")));
    }
    for key in table.foreign_keys {
        lines.push(format!(
            "  FOREIGN KEY ({}) REFERENCES {} ({})",
            key.columns.join(", "),
            key.table,
            key.references.join(", ")
        ));
    }
    format!("CREATE TABLE {} (\n{}\n);\n", table.name, lines.join(",\n"))
}

fn render_column(column: &ColumnDef) -> String {
    if column.auto_increment {
        return format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", column.name);
    }

    let mut sql = format!("{} {}", column.name, column.sql_type.as_sql());
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = column.default {
        if default.starts_with('\'') || default.chars().all(|c| c.is_ascii_digit() || c == '.') {
            sql.push_str(&format!(" DEFAULT {default}"));
        } else {
            sql.push_str(&format!(" DEFAULT ({default})"));
        }
    }
    if !column.allowed.is_empty() {
        let values = column
            .allowed
            .iter()
            .map(|value| format!("'{value}'"))
            .collect::<Vec<_>>()
            .join(", ");
        if column.nullable {
            sql.push_str(&format!(
                " CHECK ({name} IS NULL OR {name} IN ({values}))",
                name = column.name
            ));
        } else {
            sql.push_str(&format!(" CHECK ({} IN ({values}))", column.name));
        }
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_catalog_table() {
        let ddl = render_ddl();
        for name in expected_tables() {
            assert!(
                ddl.contains(&format!("CREATE TABLE {name} (")),
                "missing DDL for {name}"
            );
        }
        assert_eq!(expected_tables().len(), 21);
    }

    #[test]
    fn renders_checks_and_autoincrement() {
        let ddl = render_ddl();
        assert!(ddl.contains("class TEXT NOT NULL CHECK (class IN ('warrior', 'mage', 'assassin'))"));
        assert!(ddl.contains("id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(ddl.contains("class_requirement TEXT CHECK (class_requirement IS NULL OR"));
        assert!(ddl.contains("created_at DATETIME NOT NULL DEFAULT (CURRENT_TIMESTAMP)"));
        assert!(ddl.contains("PRIMARY KEY (character_id, slot)"));
    }

    #[test]
    fn builtin_script_appends_reference_data() {
        let script = builtin_init_script();
        assert!(script.starts_with("CREATE TABLE characters"));
        assert!(script.contains("INSERT INTO skills"));
        assert!(script.contains("INSERT INTO achievements"));
        assert!(script.contains(&format!(
            "INSERT INTO database_version (version, description) VALUES ({}, ",
            crate::CATALOG_VERSION
        )));
    }
}
