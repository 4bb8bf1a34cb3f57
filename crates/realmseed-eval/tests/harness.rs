use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{Connection, SqliteConnection};

use realmseed_core::builtin_init_script;
use realmseed_eval::{
    CardinalityCheck, HarnessConfig, check_minimum_cardinality, check_schema, collect_stats,
    run_harness,
};
use realmseed_generate::{GenerationEngine, apply_script};
use realmseed_plan::{PhaseCounts, SeedPlan};

async fn initialised_store() -> anyhow::Result<SqliteConnection> {
    let mut conn = SqliteConnection::connect("sqlite::memory:")
        .await
        .context("open in-memory store")?;
    apply_script(&mut conn, &builtin_init_script())
        .await
        .context("apply built-in script")?;
    Ok(conn)
}

async fn seeded_store() -> anyhow::Result<SqliteConnection> {
    let mut conn = initialised_store().await?;
    let plan = SeedPlan {
        seed: Some(2024),
        base_time: NaiveDate::from_ymd_opt(2024, 2, 1).and_then(|d| d.and_hms_opt(8, 0, 0)),
        counts: PhaseCounts {
            characters: 40,
            ..PhaseCounts::default()
        },
    };
    GenerationEngine::default()
        .run(&mut conn, &plan)
        .await
        .context("seed store")?;
    Ok(conn)
}

#[tokio::test]
async fn initialised_store_matches_expected_tables() -> anyhow::Result<()> {
    let mut conn = initialised_store().await?;
    let config = HarnessConfig::default();

    let report = check_schema(&mut conn, &config.expected_tables).await?;

    assert!(report.missing.is_empty(), "missing: {:?}", report.missing);
    assert!(report.extra.is_empty(), "extra: {:?}", report.extra);
    assert_eq!(report.expected_count, 21);
    assert_eq!(report.found_count, 21);
    Ok(())
}

#[tokio::test]
async fn schema_check_is_idempotent() -> anyhow::Result<()> {
    let mut conn = initialised_store().await?;
    let expected = HarnessConfig::default().expected_tables;

    let first = check_schema(&mut conn, &expected).await?;
    let second = check_schema(&mut conn, &expected).await?;

    assert_eq!(first, second);
    assert!(first.fingerprint.is_some());
    Ok(())
}

#[tokio::test]
async fn extra_tables_warn_but_missing_tables_fail() -> anyhow::Result<()> {
    let mut conn = initialised_store().await?;
    sqlx::query("CREATE TABLE scratch (id INTEGER)")
        .execute(&mut conn)
        .await?;
    let expected = HarnessConfig::default().expected_tables;

    let report = check_schema(&mut conn, &expected).await?;
    assert!(report.passed());
    assert_eq!(report.extra, vec!["scratch".to_string()]);

    sqlx::query("DROP TABLE status_effects").execute(&mut conn).await?;
    let report = check_schema(&mut conn, &expected).await?;
    assert!(!report.passed());
    assert_eq!(report.missing, vec!["status_effects".to_string()]);
    Ok(())
}

#[tokio::test]
async fn unseeded_store_fails_cardinality() -> anyhow::Result<()> {
    let mut conn = initialised_store().await?;

    let report = run_harness(&mut conn, &HarnessConfig::default()).await?;

    assert!(report.schema.passed());
    assert!(!report.passed());
    let failed: Vec<&str> = report
        .failed_checks()
        .map(|check| check.label.as_str())
        .collect();
    assert_eq!(
        failed,
        vec!["warrior characters", "quests", "levels", "battle records"]
    );
    assert!(report.invariants.iter().all(|check| check.passed));
    Ok(())
}

#[tokio::test]
async fn seeded_store_passes_every_check() -> anyhow::Result<()> {
    let mut conn = seeded_store().await?;

    let report = run_harness(&mut conn, &HarnessConfig::default()).await?;

    let failures: Vec<_> = report.failed_checks().collect();
    assert!(failures.is_empty(), "failed checks: {failures:?}");
    assert!(report.passed());
    Ok(())
}

#[tokio::test]
async fn injected_bad_rows_are_caught() -> anyhow::Result<()> {
    let mut conn = seeded_store().await?;
    sqlx::query("UPDATE characters SET health = 999 WHERE id = (SELECT MIN(id) FROM characters)")
        .execute(&mut conn)
        .await?;
    sqlx::query(
        "UPDATE character_level_progress SET score = 50 \
         WHERE status = 'locked' OR status = 'unlocked'",
    )
    .execute(&mut conn)
    .await?;

    let report = run_harness(&mut conn, &HarnessConfig::default()).await?;

    assert!(!report.passed());
    let failed: Vec<&str> = report
        .failed_checks()
        .map(|check| check.label.as_str())
        .collect();
    assert!(failed.contains(&"character stats inside class bands"));
    assert!(failed.contains(&"uncleared levels carry no results"));
    Ok(())
}

#[tokio::test]
async fn quest_timestamps_must_match_every_status() -> anyhow::Result<()> {
    let mut conn = seeded_store().await?;
    let label = "quest timestamps follow status";
    let before = run_harness(&mut conn, &HarnessConfig::default()).await?;
    assert!(before.failed_checks().all(|check| check.label != label));

    sqlx::query(
        "UPDATE character_quests SET status = 'in_progress', start_time = NULL, complete_time = NULL \
         WHERE rowid = (SELECT MIN(rowid) FROM character_quests)",
    )
    .execute(&mut conn)
    .await?;
    let report = run_harness(&mut conn, &HarnessConfig::default()).await?;
    let check = report
        .invariants
        .iter()
        .find(|check| check.label == label)
        .context("quest timestamp check")?;
    assert_eq!(check.actual, Some(1));

    sqlx::query(
        "UPDATE character_quests SET status = 'not_started', start_time = NULL, \
         complete_time = '2024-01-20 10:00:00' \
         WHERE rowid = (SELECT MAX(rowid) FROM character_quests)",
    )
    .execute(&mut conn)
    .await?;
    let report = run_harness(&mut conn, &HarnessConfig::default()).await?;
    let check = report
        .invariants
        .iter()
        .find(|check| check.label == label)
        .context("quest timestamp check")?;
    assert_eq!(check.actual, Some(2));
    assert!(!report.passed());
    Ok(())
}

#[tokio::test]
async fn broken_query_is_a_failed_check_not_an_abort() -> anyhow::Result<()> {
    let mut conn = initialised_store().await?;
    let checks = vec![
        CardinalityCheck::new("skills", "SELECT COUNT(*) FROM skills", 10),
        CardinalityCheck::new("ghosts", "SELECT COUNT(*) FROM ghosts", 1),
    ];

    let outcomes = check_minimum_cardinality(&mut conn, &checks).await;

    assert!(outcomes[0].passed);
    assert_eq!(outcomes[0].actual, Some(18));
    assert!(!outcomes[1].passed);
    assert!(outcomes[1].actual.is_none());
    assert!(outcomes[1].error.as_deref().unwrap_or_default().contains("ghosts"));
    Ok(())
}

#[tokio::test]
async fn stats_count_every_catalog_table() -> anyhow::Result<()> {
    let mut conn = seeded_store().await?;

    let stats = collect_stats(&mut conn).await?;

    assert_eq!(stats.tables.len(), 21);
    assert_eq!(stats.rows("characters"), Some(40));
    assert_eq!(stats.rows("battle_records"), Some(80));
    assert_eq!(stats.distributions.len(), 4);
    let classes: i64 = stats.distributions[0].values.iter().map(|(_, n)| n).sum();
    assert_eq!(classes, 40);
    Ok(())
}
