//! Phase generators. Each one opens a transaction, writes its rows, and
//! commits before returning the per-table row counts.

pub mod achievements;
pub mod battles;
pub mod characters;
pub mod levels;
pub mod loadout;
pub mod logs;
pub mod progress;
pub mod quests;
pub mod saves;

use rand::Rng;

use crate::ids::pick;
use crate::model::RowCounts;
use crate::template::TokenSet;
use crate::vocab::QUEST_ITEMS;

pub(crate) fn db_error(err: sqlx::Error) -> realmseed_core::Error {
    realmseed_core::Error::Db(err.to_string())
}

pub(crate) fn bump(counts: &mut RowCounts, table: &str, rows: u64) {
    *counts.entry(table.to_string()).or_insert(0) += rows;
}

/// Independent draw of every template token.
pub fn draw_tokens<R: Rng + ?Sized>(rng: &mut R, enemies: &[&str], locations: &[&str]) -> TokenSet {
    TokenSet {
        enemy: pick(rng, enemies).to_string(),
        location: pick(rng, locations).to_string(),
        item: pick(rng, QUEST_ITEMS).to_string(),
        count: rng.random_range(1..=5),
    }
}
