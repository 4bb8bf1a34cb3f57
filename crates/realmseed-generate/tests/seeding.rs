use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sqlx::{Connection, SqliteConnection};

use realmseed_core::{CharacterClass, builtin_init_script};
use realmseed_generate::generators::loadout::assign_skills;
use realmseed_generate::{
    CharacterRef, GenerationEngine, GenerationError, PhaseKind, Pipeline, apply_script,
};
use realmseed_plan::{PhaseCounts, SeedPlan};

fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|date| date.and_hms_opt(10, 30, 0))
        .expect("valid base time")
}

fn default_plan(seed: u64) -> SeedPlan {
    SeedPlan {
        seed: Some(seed),
        base_time: Some(base_time()),
        counts: PhaseCounts::default(),
    }
}

async fn fresh_store() -> anyhow::Result<SqliteConnection> {
    let mut conn = SqliteConnection::connect("sqlite::memory:")
        .await
        .context("open in-memory store")?;
    apply_script(&mut conn, &builtin_init_script())
        .await
        .context("apply built-in script")?;
    Ok(conn)
}

async fn count(conn: &mut SqliteConnection, sql: &str) -> anyhow::Result<i64> {
    sqlx::query_scalar(sql)
        .fetch_one(&mut *conn)
        .await
        .with_context(|| format!("run '{sql}'"))
}

#[tokio::test]
async fn full_seed_satisfies_cross_table_invariants() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    let report = GenerationEngine::default()
        .run(&mut conn, &default_plan(42))
        .await
        .context("seed store")?;

    assert_eq!(report.seed, 42);
    assert_eq!(report.phases.len(), 10);
    assert_eq!(report.rows_written("characters"), 15);
    assert_eq!(report.rows_written("battle_records"), 80);
    assert_eq!(report.rows_written("game_logs"), 150);

    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM characters").await?, 15);
    assert_eq!(
        count(&mut conn, "SELECT COUNT(*) FROM characters WHERE is_player = 1").await?,
        1
    );

    let out_of_band = count(
        &mut conn,
        "SELECT COUNT(*) FROM characters WHERE NOT (
            (class = 'warrior' AND health BETWEEN 120 AND 150 AND mana BETWEEN 30 AND 50
                AND attack BETWEEN 20 AND 25 AND defense BETWEEN 15 AND 20)
         OR (class = 'mage' AND health BETWEEN 80 AND 100 AND mana BETWEEN 80 AND 120
                AND attack BETWEEN 10 AND 15 AND defense BETWEEN 8 AND 12)
         OR (class = 'assassin' AND health BETWEEN 90 AND 110 AND mana BETWEEN 40 AND 60
                AND attack BETWEEN 25 AND 30 AND defense BETWEEN 10 AND 15))",
    )
    .await?;
    assert_eq!(out_of_band, 0);

    let ineligible_skills = count(
        &mut conn,
        "SELECT COUNT(*) FROM character_skills cs
         JOIN characters c ON c.id = cs.character_id
         JOIN skills s ON s.id = cs.skill_id
         WHERE s.level_requirement > c.level OR s.class_requirement <> c.class",
    )
    .await?;
    assert_eq!(ineligible_skills, 0);
    let overloaded = count(
        &mut conn,
        "SELECT COUNT(*) FROM (SELECT character_id FROM character_skills
         GROUP BY character_id HAVING COUNT(*) > 5)",
    )
    .await?;
    assert_eq!(overloaded, 0);

    let ineligible_equipment = count(
        &mut conn,
        "SELECT COUNT(*) FROM character_equipment ce
         JOIN characters c ON c.id = ce.character_id
         JOIN equipment e ON e.id = ce.equipment_id
         WHERE e.level_requirement > c.level OR e.slot <> ce.slot
            OR (e.class_requirement IS NOT NULL AND e.class_requirement <> c.class)",
    )
    .await?;
    assert_eq!(ineligible_equipment, 0);

    let orphan_saves = count(
        &mut conn,
        "SELECT COUNT(*) FROM save_data sd
         JOIN characters c ON c.id = sd.character_id WHERE c.is_player = 0",
    )
    .await?;
    assert_eq!(orphan_saves, 0);
    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM save_data").await?, 8);

    let unzeroed = count(
        &mut conn,
        "SELECT COUNT(*) FROM character_level_progress
         WHERE status IN ('locked', 'unlocked')
           AND (completion_time <> 0 OR score <> 0 OR stars <> 0 OR attempts <> 0 OR best_time <> 0)",
    )
    .await?;
    assert_eq!(unzeroed, 0);

    let bad_quest_times = count(
        &mut conn,
        "SELECT COUNT(*) FROM character_quests
         WHERE (status = 'not_started' AND start_time IS NOT NULL)
            OR (status = 'completed' AND (start_time IS NULL OR complete_time IS NULL
                OR complete_time <= start_time))",
    )
    .await?;
    assert_eq!(bad_quest_times, 0);

    let bad_unlocks = count(
        &mut conn,
        "SELECT COUNT(*) FROM character_achievements
         WHERE (unlocked = 1) <> (unlock_date IS NOT NULL)",
    )
    .await?;
    assert_eq!(bad_unlocks, 0);

    let stray_levels = count(
        &mut conn,
        "SELECT COUNT(*) FROM battle_records WHERE level_id IS NOT NULL AND battle_type <> 'level'",
    )
    .await?;
    assert_eq!(stray_levels, 0);

    let stats_per_character = count(
        &mut conn,
        "SELECT COUNT(*) FROM (SELECT character_id FROM statistics
         GROUP BY character_id HAVING COUNT(*) <> 7)",
    )
    .await?;
    assert_eq!(stats_per_character, 0);

    Ok(())
}

#[tokio::test]
async fn same_seed_reproduces_rows() -> anyhow::Result<()> {
    let mut first = fresh_store().await?;
    let mut second = fresh_store().await?;
    let engine = GenerationEngine::default();
    engine.run(&mut first, &default_plan(7)).await?;
    engine.run(&mut second, &default_plan(7)).await?;

    for sql in [
        "SELECT id || name || class || level || health FROM characters ORDER BY id",
        "SELECT id || title || objectives || rewards FROM quests ORDER BY id",
        "SELECT character_id || skill_id || skill_level FROM character_skills ORDER BY 1",
        "SELECT character_id || log_level || message || data FROM game_logs WHERE character_id IS NOT NULL ORDER BY id",
    ] {
        let left: Vec<String> = sqlx::query_scalar(sql).fetch_all(&mut first).await?;
        let right: Vec<String> = sqlx::query_scalar(sql).fetch_all(&mut second).await?;
        assert!(!left.is_empty(), "no rows for {sql}");
        assert_eq!(left, right, "rows differ for {sql}");
    }
    Ok(())
}

#[tokio::test]
async fn repeated_seeding_keeps_a_single_player() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    let engine = GenerationEngine::default();
    engine.run(&mut conn, &default_plan(1)).await?;
    let second = engine.run(&mut conn, &default_plan(2)).await?;

    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM characters").await?, 30);
    assert_eq!(
        count(&mut conn, "SELECT COUNT(*) FROM characters WHERE is_player = 1").await?,
        1
    );
    assert_eq!(second.issue_count("player_exists"), 1);
    assert_eq!(second.rows_written("statistics"), 15 * 7);
    Ok(())
}

#[tokio::test]
async fn save_slots_without_player_are_skipped() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    let mut plan = SeedPlan::empty().with_seed(3);
    plan.counts.save_slots = 3;

    let report = GenerationEngine::default().run(&mut conn, &plan).await?;

    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM save_data").await?, 0);
    assert_eq!(report.issue_count("no_player_character"), 1);
    assert_eq!(report.rows_written("save_data"), 0);
    Ok(())
}

#[tokio::test]
async fn level_one_character_only_gets_level_one_skills() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    sqlx::query(
        "INSERT INTO characters (id, name, class, level, experience, health, max_health, mana, \
         max_mana, attack, defense) VALUES ('char_rookie', 'Rookie', 'mage', 1, 0, 90, 90, 100, \
         100, 12, 10)",
    )
    .execute(&mut conn)
    .await?;
    let rookie = CharacterRef {
        id: "char_rookie".to_string(),
        name: "Rookie".to_string(),
        class: CharacterClass::Mage,
        level: 1,
        is_player: false,
    };

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let written = assign_skills(&mut conn, &mut rng, &rookie).await?;
    assert_eq!(written, 2);
    let above_level = count(
        &mut conn,
        "SELECT COUNT(*) FROM character_skills cs JOIN skills s ON s.id = cs.skill_id
         WHERE cs.character_id = 'char_rookie' AND s.level_requirement > 1",
    )
    .await?;
    assert_eq!(above_level, 0);

    sqlx::query("DELETE FROM character_skills").execute(&mut conn).await?;
    sqlx::query("DELETE FROM skills WHERE class_requirement = 'mage' AND level_requirement <= 1")
        .execute(&mut conn)
        .await?;
    let written = assign_skills(&mut conn, &mut rng, &rookie).await?;
    assert_eq!(written, 0);
    Ok(())
}

#[tokio::test]
async fn missing_equipment_is_skipped_and_reported() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    sqlx::query("DELETE FROM equipment WHERE slot = 'ring'")
        .execute(&mut conn)
        .await?;
    let mut plan = SeedPlan::empty().with_seed(8);
    plan.counts.characters = 4;

    let report = GenerationEngine::default().run(&mut conn, &plan).await?;

    assert_eq!(
        count(&mut conn, "SELECT COUNT(*) FROM character_equipment WHERE slot = 'ring'").await?,
        0
    );
    assert_eq!(report.issue_count("constraint_unsatisfiable"), 4);
    assert_eq!(report.rows_written("character_equipment"), 8);
    Ok(())
}

#[tokio::test]
async fn failing_phase_keeps_earlier_phases_committed() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    sqlx::query(
        "CREATE TRIGGER reject_logs BEFORE INSERT ON game_logs \
         BEGIN SELECT RAISE(ABORT, 'logs disabled'); END",
    )
    .execute(&mut conn)
    .await?;

    let err = GenerationEngine::default()
        .run(&mut conn, &default_plan(9))
        .await
        .expect_err("logs phase must fail");
    assert!(matches!(err, GenerationError::Write { ref phase, .. } if phase == "logs"));

    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM characters").await?, 15);
    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM save_data").await?, 8);
    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM game_logs").await?, 0);
    Ok(())
}

#[tokio::test]
async fn store_missing_a_table_is_refused() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    sqlx::query("DROP TABLE game_logs").execute(&mut conn).await?;

    let err = GenerationEngine::default()
        .run(&mut conn, &default_plan(1))
        .await
        .expect_err("contract check must fail");
    assert!(matches!(err, GenerationError::Contract(_)));
    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM characters").await?, 0);
    Ok(())
}

#[tokio::test]
async fn init_records_the_catalog_version() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    let version = count(&mut conn, "SELECT MAX(version) FROM database_version").await?;
    assert_eq!(version, realmseed_core::CATALOG_VERSION);
    Ok(())
}

#[tokio::test]
async fn reapplying_the_script_is_a_script_error() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    let err = apply_script(&mut conn, &builtin_init_script())
        .await
        .expect_err("tables already exist");
    assert!(matches!(err, GenerationError::Script(_)));
    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM skills").await?, 18);
    Ok(())
}

#[tokio::test]
async fn custom_pipeline_runs_only_its_phases() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    let pipeline = Pipeline::new(vec![PhaseKind::Characters, PhaseKind::Quests])?;
    let report = GenerationEngine::new(pipeline)
        .run(&mut conn, &default_plan(4))
        .await?;

    assert_eq!(report.phases.len(), 2);
    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM quests").await?, 25);
    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM character_skills").await?, 0);
    let typed_counts = count(
        &mut conn,
        "SELECT COUNT(*) FROM quests
         WHERE json_type(objectives, '$[0].count') NOT IN ('integer')
           AND json_extract(objectives, '$[0].type') <> 'reach'",
    )
    .await?;
    assert_eq!(typed_counts, 0);
    Ok(())
}

#[tokio::test]
async fn oversized_plan_is_refused_before_writing() -> anyhow::Result<()> {
    let mut conn = fresh_store().await?;
    let mut plan = default_plan(8);
    plan.counts.logs = 2_000_000;

    let err = GenerationEngine::default()
        .run(&mut conn, &plan)
        .await
        .expect_err("count above the per-phase limit");
    assert!(matches!(err, GenerationError::InvalidPlan(_)));
    assert_eq!(count(&mut conn, "SELECT COUNT(*) FROM characters").await?, 0);
    Ok(())
}
