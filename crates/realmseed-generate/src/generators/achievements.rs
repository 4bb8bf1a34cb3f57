use chrono::Duration;
use serde_json::json;
use sqlx::{Connection, SqliteConnection};
use rand::Rng;

use realmseed_core::tables;

use crate::errors::{GenerationError, write_error};
use crate::generators::bump;
use crate::generators::progress::{choose_pairs, existing_pairs, note_truncation};
use crate::model::{GenerationIssue, RowCounts};
use crate::session::{GenerationSession, format_timestamp};

pub const PHASE: &str = "achievements";

/// Unlock rows over distinct (character, achievement) pairs.
pub async fn generate_achievements(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(PHASE);
    let mut issues = Vec::new();
    let mut counts = RowCounts::new();
    bump(&mut counts, tables::CHARACTER_ACHIEVEMENTS, 0);

    let achievement_ids: Vec<String> = sqlx::query_scalar("SELECT id FROM achievements ORDER BY id")
        .fetch_all(&mut *conn)
        .await
        .map_err(write_error(PHASE))?;
    if count > 0 && achievement_ids.is_empty() {
        session.record_issue(GenerationIssue::warning(
            PHASE,
            "no_achievements",
            "achievements table is empty; nothing to unlock",
        ));
        return Ok(counts);
    }

    let taken = existing_pairs(
        conn,
        tables::CHARACTER_ACHIEVEMENTS,
        "character_id",
        "achievement_id",
    )
    .await
    .map_err(write_error(PHASE))?;
    let characters: Vec<&str> = session.pools.characters.iter().map(|c| c.id.as_str()).collect();
    let achievements: Vec<&str> = achievement_ids.iter().map(String::as_str).collect();
    let (pairs, available) =
        choose_pairs(&mut rng, &characters, &achievements, &taken, count as usize);
    note_truncation(&mut issues, PHASE, count, available);

    let mut tx = conn.begin().await.map_err(write_error(PHASE))?;
    for (c, a) in &pairs {
        let unlocked = rng.random_bool(0.5);
        let (unlock_date, progress) = if unlocked {
            let date = session.base_time() - Duration::days(rng.random_range(1..=30));
            (Some(format_timestamp(date)), 100)
        } else {
            (None, rng.random_range(0..=99))
        };

        sqlx::query(
            "INSERT INTO character_achievements \
             (character_id, achievement_id, unlocked, unlock_date, progress) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(characters[*c])
        .bind(achievements[*a])
        .bind(unlocked)
        .bind(unlock_date)
        .bind(json!({ "progress": progress }).to_string())
        .execute(&mut *tx)
        .await
        .map_err(write_error(PHASE))?;
    }
    tx.commit().await.map_err(write_error(PHASE))?;

    bump(&mut counts, tables::CHARACTER_ACHIEVEMENTS, pairs.len() as u64);
    for issue in issues {
        session.record_issue(issue);
    }
    Ok(counts)
}
