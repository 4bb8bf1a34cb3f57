use fake::Fake;
use fake::faker::name::en::FirstName;
use rand::Rng;
use sqlx::{Connection, SqliteConnection};
use tracing::info;

use realmseed_core::{CharacterClass, tables};

use crate::errors::{GenerationError, write_error};
use crate::generators::bump;
use crate::ids::{pick, unique_id};
use crate::model::{GenerationIssue, RowCounts};
use crate::pool::{CharacterRef, PoolKind};
use crate::session::{GenerationSession, format_timestamp};

pub const PHASE: &str = "characters";

/// A character before it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterDraft {
    pub id: String,
    pub name: String,
    pub class: CharacterClass,
    pub level: i64,
    pub experience: i64,
    pub health: i64,
    pub mana: i64,
    pub attack: i64,
    pub defense: i64,
    pub speed: i64,
    pub critical_rate: f64,
    pub critical_damage: f64,
    pub is_player: bool,
}

impl CharacterDraft {
    fn into_ref(self) -> CharacterRef {
        CharacterRef {
            id: self.id,
            name: self.name,
            class: self.class,
            level: self.level,
            is_player: self.is_player,
        }
    }
}

/// Draw class, level, and class-banded stats for one character.
pub fn draw_character<R: Rng + ?Sized>(rng: &mut R, id: String, is_player: bool) -> CharacterDraft {
    let name: String = FirstName().fake_with_rng(rng);
    let class = *pick(rng, CharacterClass::ALL);
    let bands = class.stat_bands();
    let health = rng.random_range(bands.health.range());
    let mana = rng.random_range(bands.mana.range());
    let attack = rng.random_range(bands.attack.range());
    let defense = rng.random_range(bands.defense.range());
    let level = rng.random_range(1..=20);
    let experience = rng.random_range(0..=level * 100);

    CharacterDraft {
        id,
        name,
        class,
        level,
        experience,
        health,
        mana,
        attack,
        defense,
        speed: rng.random_range(5..=8),
        critical_rate: rng.random_range(0.05..=0.15),
        critical_damage: rng.random_range(1.5..=2.0),
        is_player,
    }
}

/// Write `count` characters; the first becomes the player when the store has none.
pub async fn generate_characters(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(PHASE);
    let mut taken = session.pools.ids(PoolKind::Characters);
    let had_player = session.pools.has_player();
    let mut player_pending = !had_player;
    let created_at = format_timestamp(session.base_time());

    let mut tx = conn.begin().await.map_err(write_error(PHASE))?;
    let mut drafts = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let id = unique_id("char", &mut rng, &mut taken);
        let is_player = std::mem::take(&mut player_pending);
        let draft = draw_character(&mut rng, id, is_player);

        sqlx::query(
            "INSERT INTO characters (id, name, class, level, experience, health, max_health, \
             mana, max_mana, attack, defense, speed, critical_rate, critical_damage, is_player, \
             created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&draft.id)
        .bind(&draft.name)
        .bind(draft.class.as_str())
        .bind(draft.level)
        .bind(draft.experience)
        .bind(draft.health)
        .bind(draft.health)
        .bind(draft.mana)
        .bind(draft.mana)
        .bind(draft.attack)
        .bind(draft.defense)
        .bind(draft.speed)
        .bind(draft.critical_rate)
        .bind(draft.critical_damage)
        .bind(draft.is_player)
        .bind(&created_at)
        .execute(&mut *tx)
        .await
        .map_err(write_error(PHASE))?;

        drafts.push(draft);
    }
    tx.commit().await.map_err(write_error(PHASE))?;

    if count > 0 && had_player {
        info!(event = "player_exists", "store already has a player; no new player flagged");
        session.record_issue(GenerationIssue::info(
            PHASE,
            "player_exists",
            "store already holds a player character",
        ));
    }

    session
        .pools
        .characters
        .extend(drafts.into_iter().map(CharacterDraft::into_ref));

    let mut counts = RowCounts::new();
    bump(&mut counts, tables::CHARACTERS, u64::from(count));
    Ok(counts)
}
