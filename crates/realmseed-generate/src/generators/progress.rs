//! Quest and level progress rows over distinct character pairs.

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use serde_json::{Value, json};
use sqlx::{Connection, SqliteConnection};
use tracing::info;

use realmseed_core::{LevelStatus, QuestStatus, tables};

use crate::errors::{GenerationError, write_error};
use crate::generators::bump;
use crate::ids::pick;
use crate::model::{GenerationIssue, RowCounts};
use crate::session::{GenerationSession, format_timestamp};

pub const QUEST_PHASE: &str = "quest_progress";
pub const LEVEL_PHASE: &str = "level_progress";

/// Pairs already present in `table`.
pub(crate) async fn existing_pairs(
    conn: &mut SqliteConnection,
    table: &str,
    left: &str,
    right: &str,
) -> Result<HashSet<(String, String)>, sqlx::Error> {
    let query = format!("SELECT {left}, {right} FROM {table}");
    let rows: Vec<(String, String)> = sqlx::query_as(&query).fetch_all(&mut *conn).await?;
    Ok(rows.into_iter().collect())
}

/// Up to `count` distinct `(left, right)` index pairs not in `taken`, in
/// draw order, plus the number of pairs that were available.
///
/// Small requests over a mostly free grid are drawn by rejection; the full
/// list of free pairs is only built when the request is dense.
pub fn choose_pairs<R: Rng + ?Sized>(
    rng: &mut R,
    left: &[&str],
    right: &[&str],
    taken: &HashSet<(String, String)>,
    count: usize,
) -> (Vec<(usize, usize)>, usize) {
    let left_ids: HashSet<&str> = left.iter().copied().collect();
    let right_ids: HashSet<&str> = right.iter().copied().collect();
    let taken: HashSet<(&str, &str)> = taken
        .iter()
        .map(|(l, r)| (l.as_str(), r.as_str()))
        .filter(|(l, r)| left_ids.contains(l) && right_ids.contains(r))
        .collect();

    let total = left.len().saturating_mul(right.len());
    let available = total.saturating_sub(taken.len());
    let wanted = count.min(available);
    if wanted == 0 {
        return (Vec::new(), available);
    }

    if wanted.saturating_mul(4) <= available && available.saturating_mul(4) >= total {
        let mut seen = HashSet::with_capacity(wanted);
        let mut chosen = Vec::with_capacity(wanted);
        while chosen.len() < wanted {
            let pair = (
                rng.random_range(0..left.len()),
                rng.random_range(0..right.len()),
            );
            if taken.contains(&(left[pair.0], right[pair.1])) || !seen.insert(pair) {
                continue;
            }
            chosen.push(pair);
        }
        return (chosen, available);
    }

    let mut free = Vec::with_capacity(available);
    for (l, left_id) in left.iter().enumerate() {
        for (r, right_id) in right.iter().enumerate() {
            if !taken.contains(&(*left_id, *right_id)) {
                free.push((l, r));
            }
        }
    }
    let chosen = crate::ids::sample(rng, &free, wanted)
        .into_iter()
        .copied()
        .collect();
    (chosen, available)
}

/// Record truncation when fewer pairs exist than were requested.
pub(crate) fn note_truncation(
    issues: &mut Vec<GenerationIssue>,
    phase: &str,
    requested: u32,
    available: usize,
) {
    if (requested as usize) > available {
        info!(phase, requested, available, "progress request truncated");
        issues.push(GenerationIssue::warning(
            phase,
            "pairs_exhausted",
            format!("{requested} rows requested but only {available} free pairs"),
        ));
    }
}

/// Status-dependent quest progress fields.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestProgressDraft {
    pub status: QuestStatus,
    pub progress: Value,
    pub start_time: Option<NaiveDateTime>,
    pub complete_time: Option<NaiveDateTime>,
}

pub fn draw_quest_progress<R: Rng + ?Sized>(
    rng: &mut R,
    base_time: NaiveDateTime,
    objective_count: i64,
) -> QuestProgressDraft {
    let status = *pick(rng, QuestStatus::ALL);
    match status {
        QuestStatus::NotStarted => QuestProgressDraft {
            status,
            progress: json!({}),
            start_time: None,
            complete_time: None,
        },
        QuestStatus::InProgress => {
            let start = base_time - Duration::days(rng.random_range(1..=7));
            let done = if objective_count > 0 {
                rng.random_range(0..objective_count)
            } else {
                0
            };
            QuestProgressDraft {
                status,
                progress: json!({"completed_objectives": done}),
                start_time: Some(start),
                complete_time: None,
            }
        }
        QuestStatus::Completed => {
            let start = base_time - Duration::days(rng.random_range(1..=7));
            let complete = start + Duration::hours(rng.random_range(1..=24));
            QuestProgressDraft {
                status,
                progress: json!({"completed_objectives": objective_count, "all_completed": true}),
                start_time: Some(start),
                complete_time: Some(complete),
            }
        }
    }
}

/// Level progress; timing, score, stars, and attempts are zero unless the
/// level was cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProgressDraft {
    pub status: LevelStatus,
    pub completion_time: i64,
    pub score: i64,
    pub stars: i64,
    pub attempts: i64,
    pub best_time: i64,
}

pub fn draw_level_progress<R: Rng + ?Sized>(rng: &mut R) -> LevelProgressDraft {
    let status = *pick(rng, LevelStatus::ALL);
    if !status.is_cleared() {
        return LevelProgressDraft {
            status,
            completion_time: 0,
            score: 0,
            stars: 0,
            attempts: 0,
            best_time: 0,
        };
    }

    let completion_time = rng.random_range(60..=600);
    let score = rng.random_range(1000..=10000);
    let stars = match status {
        LevelStatus::Perfect => 3,
        _ => rng.random_range(1..=3),
    };
    LevelProgressDraft {
        status,
        completion_time,
        score,
        stars,
        attempts: rng.random_range(1..=5),
        best_time: completion_time,
    }
}

pub async fn generate_quest_progress(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(QUEST_PHASE);
    let mut issues = Vec::new();
    let mut counts = RowCounts::new();
    bump(&mut counts, tables::CHARACTER_QUESTS, 0);

    let taken = existing_pairs(conn, tables::CHARACTER_QUESTS, "character_id", "quest_id")
        .await
        .map_err(write_error(QUEST_PHASE))?;
    let characters: Vec<&str> = session.pools.characters.iter().map(|c| c.id.as_str()).collect();
    let quests: Vec<&str> = session.pools.quests.iter().map(|q| q.id.as_str()).collect();
    let (pairs, available) = choose_pairs(&mut rng, &characters, &quests, &taken, count as usize);
    note_truncation(&mut issues, QUEST_PHASE, count, available);

    let mut tx = conn.begin().await.map_err(write_error(QUEST_PHASE))?;
    for (c, q) in &pairs {
        let quest = &session.pools.quests[*q];
        let draft = draw_quest_progress(&mut rng, session.base_time(), quest.objective_count);
        sqlx::query(
            "INSERT INTO character_quests \
             (character_id, quest_id, status, progress, start_time, complete_time) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(characters[*c])
        .bind(&quest.id)
        .bind(draft.status.as_str())
        .bind(draft.progress.to_string())
        .bind(draft.start_time.map(format_timestamp))
        .bind(draft.complete_time.map(format_timestamp))
        .execute(&mut *tx)
        .await
        .map_err(write_error(QUEST_PHASE))?;
    }
    tx.commit().await.map_err(write_error(QUEST_PHASE))?;

    bump(&mut counts, tables::CHARACTER_QUESTS, pairs.len() as u64);
    for issue in issues {
        session.record_issue(issue);
    }
    Ok(counts)
}

pub async fn generate_level_progress(
    conn: &mut SqliteConnection,
    session: &mut GenerationSession,
    count: u32,
) -> Result<RowCounts, GenerationError> {
    let mut rng = session.phase_rng(LEVEL_PHASE);
    let mut issues = Vec::new();
    let mut counts = RowCounts::new();
    bump(&mut counts, tables::CHARACTER_LEVEL_PROGRESS, 0);

    let taken = existing_pairs(
        conn,
        tables::CHARACTER_LEVEL_PROGRESS,
        "character_id",
        "level_id",
    )
    .await
    .map_err(write_error(LEVEL_PHASE))?;
    let characters: Vec<&str> = session.pools.characters.iter().map(|c| c.id.as_str()).collect();
    let levels: Vec<&str> = session.pools.levels.iter().map(String::as_str).collect();
    let (pairs, available) = choose_pairs(&mut rng, &characters, &levels, &taken, count as usize);
    note_truncation(&mut issues, LEVEL_PHASE, count, available);

    let mut tx = conn.begin().await.map_err(write_error(LEVEL_PHASE))?;
    for (c, l) in &pairs {
        let draft = draw_level_progress(&mut rng);
        sqlx::query(
            "INSERT INTO character_level_progress \
             (character_id, level_id, status, completion_time, score, stars, attempts, best_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(characters[*c])
        .bind(levels[*l])
        .bind(draft.status.as_str())
        .bind(draft.completion_time)
        .bind(draft.score)
        .bind(draft.stars)
        .bind(draft.attempts)
        .bind(draft.best_time)
        .execute(&mut *tx)
        .await
        .map_err(write_error(LEVEL_PHASE))?;
    }
    tx.commit().await.map_err(write_error(LEVEL_PHASE))?;

    bump(&mut counts, tables::CHARACTER_LEVEL_PROGRESS, pairs.len() as u64);
    for issue in issues {
        session.record_issue(issue);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid base time")
    }

    #[test]
    fn quest_timestamps_follow_status() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        for _ in 0..300 {
            let draft = draw_quest_progress(&mut rng, base(), 1);
            match draft.status {
                QuestStatus::NotStarted => {
                    assert!(draft.start_time.is_none());
                    assert!(draft.complete_time.is_none());
                }
                QuestStatus::InProgress => {
                    assert!(draft.start_time.is_some());
                    assert!(draft.complete_time.is_none());
                    assert_eq!(draft.progress["completed_objectives"], 0);
                }
                QuestStatus::Completed => {
                    let start = draft.start_time.expect("start");
                    let complete = draft.complete_time.expect("complete");
                    assert!(complete > start);
                    assert_eq!(draft.progress["completed_objectives"], 1);
                }
            }
        }
    }

    #[test]
    fn uncleared_levels_are_zeroed() {
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        for _ in 0..300 {
            let draft = draw_level_progress(&mut rng);
            if draft.status.is_cleared() {
                assert!(draft.score >= 1000);
                assert_eq!(draft.best_time, draft.completion_time);
                if draft.status == LevelStatus::Perfect {
                    assert_eq!(draft.stars, 3);
                }
            } else {
                assert_eq!(
                    (draft.completion_time, draft.score, draft.stars, draft.attempts, draft.best_time),
                    (0, 0, 0, 0, 0)
                );
            }
        }
    }

    #[test]
    fn pairs_are_distinct_and_skip_taken() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let taken: HashSet<(String, String)> =
            [("c1".to_string(), "q1".to_string())].into_iter().collect();
        let (pairs, available) = choose_pairs(&mut rng, &["c1", "c2"], &["q1", "q2"], &taken, 10);
        assert_eq!(available, 3);
        assert_eq!(pairs.len(), 3);
        assert!(!pairs.contains(&(0, 0)));
    }

    #[test]
    fn small_request_over_large_pools_draws_few_pairs() {
        let mut rng = ChaCha8Rng::seed_from_u64(24);
        let characters: Vec<String> = (0..3000).map(|i| format!("char_{i:08x}")).collect();
        let quests: Vec<String> = (0..3000).map(|i| format!("quest_{i:08x}")).collect();
        let left: Vec<&str> = characters.iter().map(String::as_str).collect();
        let right: Vec<&str> = quests.iter().map(String::as_str).collect();
        let taken: HashSet<(String, String)> = (0..100)
            .map(|i| (characters[i].clone(), quests[i].clone()))
            .chain([("char_gone".to_string(), quests[0].clone())])
            .collect();

        let (pairs, available) = choose_pairs(&mut rng, &left, &right, &taken, 5);
        assert_eq!(available, 9_000_000 - 100);
        assert_eq!(pairs.len(), 5);
        let distinct: HashSet<&(usize, usize)> = pairs.iter().collect();
        assert_eq!(distinct.len(), 5);
        for (l, r) in &pairs {
            assert!(!taken.contains(&(characters[*l].clone(), quests[*r].clone())));
        }
    }

    #[test]
    fn dense_request_exhausts_free_pairs() {
        let mut rng = ChaCha8Rng::seed_from_u64(25);
        let taken: HashSet<(String, String)> = [
            ("c1".to_string(), "q1".to_string()),
            ("c2".to_string(), "q2".to_string()),
        ]
        .into_iter()
        .collect();
        let (pairs, available) =
            choose_pairs(&mut rng, &["c1", "c2", "c3"], &["q1", "q2"], &taken, 3);
        assert_eq!(available, 4);
        assert_eq!(pairs.len(), 3);
        assert!(!pairs.contains(&(0, 0)) && !pairs.contains(&(1, 1)));
    }
}
