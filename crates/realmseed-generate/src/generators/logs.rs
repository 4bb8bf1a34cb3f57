use rand::Rng;
use serde_json::json;
use sqlx::{Connection, SqliteConnection};
use tracing::info;

use realmseed_core::{LogCategory, LogLevel, tables};

use crate::errors::{GenerationError, write_error};
use crate::generators::bump;
use crate::ids::pick;
use crate::model::{GenerationIssue, RowCounts};
use crate::session::{GenerationSession, format_timestamp};
use crate::vocab::LOG_MESSAGES;

pub const PHASE: &str = "logs";

const THIRTY_DAYS: i64 = 30 * 24 * 3600;

pub async fn generate_logs(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(PHASE);
    let mut counts = RowCounts::new();
    bump(&mut counts, tables::GAME_LOGS, 0);

    if session.pools.characters.is_empty() {
        if count > 0 {
            info!(event = "phase_skipped", phase = PHASE, reason = "no characters");
            session.record_issue(GenerationIssue::warning(
                PHASE,
                "no_characters",
                "no characters in the store; game logs skipped",
            ));
        }
        return Ok(counts);
    }

    let mut tx = conn.begin().await.map_err(write_error(PHASE))?;
    for _ in 0..count {
        let character_id = if rng.random_bool(0.5) {
            Some(pick(&mut rng, &session.pools.characters).id.clone())
        } else {
            None
        };
        let level = *pick(&mut rng, LogLevel::ALL);
        let category = *pick(&mut rng, LogCategory::ALL);
        let message = *pick(&mut rng, LOG_MESSAGES);
        let created_at = session.time_before(&mut rng, THIRTY_DAYS);
        let data = json!({
            "timestamp": created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "user_id": character_id,
            "session_id": format!("session_{:08x}", rng.random::<u32>()),
        });

        sqlx::query(
            "INSERT INTO game_logs (character_id, log_level, log_category, message, data, \
             created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(character_id.as_deref())
        .bind(level.as_str())
        .bind(category.as_str())
        .bind(message)
        .bind(data.to_string())
        .bind(format_timestamp(created_at))
        .execute(&mut *tx)
        .await
        .map_err(write_error(PHASE))?;
    }
    tx.commit().await.map_err(write_error(PHASE))?;

    bump(&mut counts, tables::GAME_LOGS, u64::from(count));
    Ok(counts)
}
