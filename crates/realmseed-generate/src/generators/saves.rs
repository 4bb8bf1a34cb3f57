use std::collections::HashSet;

use rand::Rng;
use serde_json::{Value, json};
use sqlx::{Connection, SqliteConnection};
use tracing::info;

use realmseed_core::tables;

use crate::errors::{GenerationError, write_error};
use crate::generators::bump;
use crate::ids::pick;
use crate::model::{GenerationIssue, RowCounts};
use crate::pool::CharacterRef;
use crate::session::{GenerationSession, format_timestamp};
use crate::vocab::GRAPHICS_QUALITY;

pub const PHASE: &str = "save_slots";

const SEVEN_DAYS: i64 = 7 * 24 * 3600;

/// Save slots for player characters; without a player nothing is written.
pub async fn generate_save_slots(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(PHASE);
    let mut counts = RowCounts::new();
    bump(&mut counts, tables::SAVE_DATA, 0);

    let players: Vec<CharacterRef> = session.pools.players().cloned().collect();
    if players.is_empty() {
        info!(
            event = "save_slots_skipped",
            requested = count,
            "no player character; save slots skipped"
        );
        session.record_issue(GenerationIssue::info(
            PHASE,
            "no_player_character",
            format!("{count} save slots requested but no player character exists"),
        ));
        return Ok(counts);
    }

    let mut taken: HashSet<String> = sqlx::query_scalar("SELECT slot_id FROM save_data")
        .fetch_all(&mut *conn)
        .await
        .map_err(write_error(PHASE))?
        .into_iter()
        .collect();

    let mut tx = conn.begin().await.map_err(write_error(PHASE))?;
    let mut next_slot = 1_u32;
    for _ in 0..count {
        let slot_id = loop {
            let candidate = format!("save_slot_{next_slot}");
            next_slot += 1;
            if taken.insert(candidate.clone()) {
                break candidate;
            }
        };
        let player = pick(&mut rng, &players);
        let current_level = if session.pools.levels.is_empty() {
            Value::Null
        } else {
            Value::String(pick(&mut rng, &session.pools.levels).clone())
        };
        let game_data = json!({
            "current_level": current_level,
            "inventory": {"gold": rng.random_range(100..=1000)},
            "settings": {"volume": rng.random_range(50..=100)},
        });
        let settings_data = json!({
            "graphics_quality": pick(&mut rng, GRAPHICS_QUALITY),
            "sound_volume": rng.random_range(50..=100),
            "music_volume": rng.random_range(50..=100),
        });
        let save_date = session.time_before(&mut rng, SEVEN_DAYS);

        sqlx::query(
            "INSERT INTO save_data (slot_id, player_name, character_id, chapter, play_time, \
             game_data, settings_data, save_date) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&slot_id)
        .bind(&player.name)
        .bind(&player.id)
        .bind(rng.random_range(1..=6_i64))
        .bind(rng.random_range(3600..=72000_i64))
        .bind(game_data.to_string())
        .bind(settings_data.to_string())
        .bind(format_timestamp(save_date))
        .execute(&mut *tx)
        .await
        .map_err(write_error(PHASE))?;
    }
    tx.commit().await.map_err(write_error(PHASE))?;

    bump(&mut counts, tables::SAVE_DATA, u64::from(count));
    Ok(counts)
}
