//! Root-entity pools shared by the phases of one run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};

use realmseed_core::{CharacterClass, Error, Result};

/// Pool a phase reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Characters,
    Quests,
    Levels,
}

impl PoolKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            PoolKind::Characters => "characters",
            PoolKind::Quests => "quests",
            PoolKind::Levels => "levels",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRef {
    pub id: String,
    pub name: String,
    pub class: CharacterClass,
    pub level: i64,
    pub is_player: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestRef {
    pub id: String,
    pub objective_count: i64,
}

#[derive(Debug, FromRow)]
struct CharacterRow {
    id: String,
    name: String,
    class: String,
    level: i64,
    is_player: bool,
}

#[derive(Debug, FromRow)]
struct QuestRow {
    id: String,
    objective_count: i64,
}

/// Identifiers of root entities known to the current run.
#[derive(Debug, Clone, Default)]
pub struct EntityPools {
    pub characters: Vec<CharacterRef>,
    pub quests: Vec<QuestRef>,
    pub levels: Vec<String>,
}

impl EntityPools {
    /// Rebuild the given pools from the store, ordered by id.
    pub async fn reload(&mut self, conn: &mut SqliteConnection, kinds: &[PoolKind]) -> Result<()> {
        for kind in kinds {
            match kind {
                PoolKind::Characters => self.characters = load_characters(conn).await?,
                PoolKind::Quests => self.quests = load_quests(conn).await?,
                PoolKind::Levels => self.levels = load_levels(conn).await?,
            }
        }
        Ok(())
    }

    pub fn players(&self) -> impl Iterator<Item = &CharacterRef> {
        self.characters.iter().filter(|character| character.is_player)
    }

    pub fn has_player(&self) -> bool {
        self.players().next().is_some()
    }

    /// Ids already used by a pool, for collision-free id draws.
    pub fn ids(&self, kind: PoolKind) -> HashSet<String> {
        match kind {
            PoolKind::Characters => self.characters.iter().map(|c| c.id.clone()).collect(),
            PoolKind::Quests => self.quests.iter().map(|q| q.id.clone()).collect(),
            PoolKind::Levels => self.levels.iter().cloned().collect(),
        }
    }
}

async fn load_characters(conn: &mut SqliteConnection) -> Result<Vec<CharacterRef>> {
    let rows: Vec<CharacterRow> = sqlx::query_as(
        "SELECT id, name, class, level, is_player FROM characters ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|err| Error::Db(err.to_string()))?;

    rows.into_iter()
        .map(|row| -> Result<CharacterRef> {
            Ok(CharacterRef {
                class: row.class.parse()?,
                id: row.id,
                name: row.name,
                level: row.level,
                is_player: row.is_player,
            })
        })
        .collect()
}

async fn load_quests(conn: &mut SqliteConnection) -> Result<Vec<QuestRef>> {
    let rows: Vec<QuestRow> = sqlx::query_as(
        "SELECT id, COALESCE(json_array_length(objectives), 0) AS objective_count \
         FROM quests ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await
    .map_err(|err| Error::Db(err.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|row| QuestRef {
            id: row.id,
            objective_count: row.objective_count,
        })
        .collect())
}

async fn load_levels(conn: &mut SqliteConnection) -> Result<Vec<String>> {
    sqlx::query_scalar("SELECT id FROM levels ORDER BY id")
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| Error::Db(err.to_string()))
}
