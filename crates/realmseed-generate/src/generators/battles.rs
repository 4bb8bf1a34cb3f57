use rand::Rng;
use serde_json::json;
use sqlx::{Connection, SqliteConnection};
use tracing::info;

use realmseed_core::{BattleResult, BattleType, tables};

use crate::errors::{GenerationError, write_error};
use crate::generators::bump;
use crate::ids::{pick, sample};
use crate::model::{GenerationIssue, RowCounts};
use crate::session::{GenerationSession, format_timestamp};
use crate::vocab::{BATTLE_DROPS, BATTLE_SKILLS, OPPONENT_TYPES};

pub const PHASE: &str = "battle_records";

const THIRTY_DAYS: i64 = 30 * 24 * 3600;

pub async fn generate_battle_records(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(PHASE);
    let mut counts = RowCounts::new();
    bump(&mut counts, tables::BATTLE_RECORDS, 0);

    if session.pools.characters.is_empty() {
        if count > 0 {
            info!(event = "phase_skipped", phase = PHASE, reason = "no characters");
            session.record_issue(GenerationIssue::warning(
                PHASE,
                "no_characters",
                "no characters in the store; battle records skipped",
            ));
        }
        return Ok(counts);
    }

    let mut tx = conn.begin().await.map_err(write_error(PHASE))?;
    for _ in 0..count {
        let character = pick(&mut rng, &session.pools.characters);
        let battle_type = *pick(&mut rng, BattleType::ALL);
        let result = *pick(&mut rng, BattleResult::ALL);
        let opponent = *pick(&mut rng, OPPONENT_TYPES);
        let level_id = match battle_type {
            BattleType::Level if !session.pools.levels.is_empty() => {
                Some(pick(&mut rng, &session.pools.levels).clone())
            }
            _ => None,
        };
        let skill_count = rng.random_range(1..=3);
        let skills_used = sample(&mut rng, BATTLE_SKILLS, skill_count);
        let drop_count = rng.random_range(0..=2);
        let items_dropped = sample(&mut rng, BATTLE_DROPS, drop_count);
        let battle_time = session.time_before(&mut rng, THIRTY_DAYS);

        sqlx::query(
            "INSERT INTO battle_records (character_id, level_id, battle_type, opponent_type, \
             result, duration, damage_dealt, damage_taken, skills_used, combo_max, \
             experience_gained, items_dropped, battle_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&character.id)
        .bind(level_id)
        .bind(battle_type.as_str())
        .bind(opponent)
        .bind(result.as_str())
        .bind(rng.random_range(30..=600_i64))
        .bind(rng.random_range(100..=2000_i64))
        .bind(rng.random_range(50..=1500_i64))
        .bind(json!(skills_used).to_string())
        .bind(rng.random_range(1..=20_i64))
        .bind(rng.random_range(10..=200_i64))
        .bind(json!(items_dropped).to_string())
        .bind(format_timestamp(battle_time))
        .execute(&mut *tx)
        .await
        .map_err(write_error(PHASE))?;
    }
    tx.commit().await.map_err(write_error(PHASE))?;

    bump(&mut counts, tables::BATTLE_RECORDS, u64::from(count));
    Ok(counts)
}
