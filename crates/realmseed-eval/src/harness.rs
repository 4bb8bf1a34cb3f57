//! Schema, cardinality, and invariant checks over a live store.
//!
//! Checks never abort the harness: a query that fails is reported as a
//! failed check carrying the store's error message.

use std::collections::BTreeSet;

use sqlx::SqliteConnection;
use tracing::{info, warn};

use realmseed_core::{CharacterClass, expected_tables};
use realmseed_introspect::introspect_sqlite;

use crate::errors::EvalError;
use crate::model::{CheckOutcome, HarnessReport, SchemaReport};

/// `query` must return a single integer of at least `minimum`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardinalityCheck {
    pub label: String,
    pub query: String,
    pub minimum: i64,
}

impl CardinalityCheck {
    pub fn new(label: impl Into<String>, query: impl Into<String>, minimum: i64) -> Self {
        Self {
            label: label.into(),
            query: query.into(),
            minimum,
        }
    }
}

/// `query` counts violations and must return 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantCheck {
    pub label: String,
    pub query: String,
}

impl InvariantCheck {
    pub fn new(label: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            query: query.into(),
        }
    }
}

/// Everything one harness run checks.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub expected_tables: Vec<String>,
    pub cardinality: Vec<CardinalityCheck>,
    pub invariants: Vec<InvariantCheck>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            expected_tables: expected_tables().into_iter().map(str::to_string).collect(),
            cardinality: default_cardinality_checks(),
            invariants: default_invariant_checks(),
        }
    }
}

pub fn default_cardinality_checks() -> Vec<CardinalityCheck> {
    vec![
        CardinalityCheck::new(
            "warrior characters",
            "SELECT COUNT(*) FROM characters WHERE class = 'warrior'",
            1,
        ),
        CardinalityCheck::new("quests", "SELECT COUNT(*) FROM quests", 1),
        CardinalityCheck::new("levels", "SELECT COUNT(*) FROM levels", 1),
        CardinalityCheck::new("achievements", "SELECT COUNT(*) FROM achievements", 1),
        CardinalityCheck::new("battle records", "SELECT COUNT(*) FROM battle_records", 1),
    ]
}

const INVARIANTS: &[(&str, &str)] = &[
    (
        "skills match class and level",
        "SELECT COUNT(*) FROM character_skills cs
         JOIN characters c ON c.id = cs.character_id
         JOIN skills s ON s.id = cs.skill_id
         WHERE s.level_requirement > c.level OR s.class_requirement <> c.class",
    ),
    (
        "at most five skills per character",
        "SELECT COUNT(*) FROM (SELECT character_id FROM character_skills
         GROUP BY character_id HAVING COUNT(*) > 5)",
    ),
    (
        "equipment matches slot, class, and level",
        "SELECT COUNT(*) FROM character_equipment ce
         JOIN characters c ON c.id = ce.character_id
         JOIN equipment e ON e.id = ce.equipment_id
         WHERE e.level_requirement > c.level OR e.slot <> ce.slot
            OR (e.class_requirement IS NOT NULL AND e.class_requirement <> c.class)",
    ),
    (
        "exactly one player when characters exist",
        "SELECT CASE WHEN (SELECT COUNT(*) FROM characters) = 0
                       OR (SELECT COUNT(*) FROM characters WHERE is_player = 1) = 1
                 THEN 0 ELSE 1 END",
    ),
    (
        "save slots belong to players",
        "SELECT COUNT(*) FROM save_data sd
         LEFT JOIN characters c ON c.id = sd.character_id
         WHERE c.id IS NULL OR c.is_player = 0",
    ),
    (
        "uncleared levels carry no results",
        "SELECT COUNT(*) FROM character_level_progress
         WHERE status IN ('locked', 'unlocked')
           AND (completion_time <> 0 OR score <> 0 OR stars <> 0 OR attempts <> 0 OR best_time <> 0)",
    ),
    (
        "quest timestamps follow status",
        "SELECT COUNT(*) FROM character_quests
         WHERE (status = 'not_started') <> (start_time IS NULL)
            OR (status = 'completed') <> (complete_time IS NOT NULL)
            OR (status = 'completed' AND complete_time <= start_time)",
    ),
    (
        "unlock date set only when unlocked",
        "SELECT COUNT(*) FROM character_achievements
         WHERE (unlocked = 1) <> (unlock_date IS NOT NULL)",
    ),
    (
        "battle level only for level battles",
        "SELECT COUNT(*) FROM battle_records WHERE level_id IS NOT NULL AND battle_type <> 'level'",
    ),
];

pub fn default_invariant_checks() -> Vec<InvariantCheck> {
    let mut checks = vec![InvariantCheck::new(
        "character stats inside class bands",
        class_bands_query(),
    )];
    checks.extend(
        INVARIANTS
            .iter()
            .map(|(label, query)| InvariantCheck::new(*label, *query)),
    );
    checks
}

/// Counts characters whose primary stats fall outside their class bands.
fn class_bands_query() -> String {
    let clauses: Vec<String> = CharacterClass::ALL
        .iter()
        .map(|class| {
            let bands = class.stat_bands();
            format!(
                "(class = '{class}' AND health BETWEEN {} AND {} AND mana BETWEEN {} AND {} \
                 AND attack BETWEEN {} AND {} AND defense BETWEEN {} AND {})",
                bands.health.min,
                bands.health.max,
                bands.mana.min,
                bands.mana.max,
                bands.attack.min,
                bands.attack.max,
                bands.defense.min,
                bands.defense.max,
            )
        })
        .collect();
    format!(
        "SELECT COUNT(*) FROM characters WHERE NOT ({})",
        clauses.join(" OR ")
    )
}

/// Compare the store's tables with `expected`; internal `sqlite_` tables are ignored.
pub async fn check_schema(
    conn: &mut SqliteConnection,
    expected: &[String],
) -> Result<SchemaReport, EvalError> {
    let snapshot = introspect_sqlite(conn).await?;
    let found: BTreeSet<&str> = snapshot.table_names().into_iter().collect();
    let wanted: BTreeSet<&str> = expected.iter().map(String::as_str).collect();

    let missing: Vec<String> = wanted.difference(&found).map(|t| t.to_string()).collect();
    let extra: Vec<String> = found.difference(&wanted).map(|t| t.to_string()).collect();

    if !extra.is_empty() {
        warn!(event = "extra_tables", tables = ?extra);
    }

    Ok(SchemaReport {
        expected_count: wanted.len(),
        found_count: found.len(),
        missing,
        extra,
        fingerprint: snapshot.fingerprint.clone(),
    })
}

/// Run every cardinality check; each reports pass or fail on its own.
pub async fn check_minimum_cardinality(
    conn: &mut SqliteConnection,
    checks: &[CardinalityCheck],
) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::with_capacity(checks.len());
    for check in checks {
        let expected = format!(">= {}", check.minimum);
        outcomes.push(match scalar(conn, &check.query).await {
            Ok(actual) => CheckOutcome {
                label: check.label.clone(),
                actual: Some(actual),
                expected,
                passed: actual >= check.minimum,
                error: None,
            },
            Err(err) => failed_query(&check.label, expected, err),
        });
    }
    outcomes
}

pub async fn check_invariants(
    conn: &mut SqliteConnection,
    checks: &[InvariantCheck],
) -> Vec<CheckOutcome> {
    let mut outcomes = Vec::with_capacity(checks.len());
    for check in checks {
        let expected = "0 violations".to_string();
        outcomes.push(match scalar(conn, &check.query).await {
            Ok(violations) => CheckOutcome {
                label: check.label.clone(),
                actual: Some(violations),
                expected,
                passed: violations == 0,
                error: None,
            },
            Err(err) => failed_query(&check.label, expected, err),
        });
    }
    outcomes
}

/// Schema check, then cardinality and invariant checks.
pub async fn run_harness(
    conn: &mut SqliteConnection,
    config: &HarnessConfig,
) -> Result<HarnessReport, EvalError> {
    let schema = check_schema(conn, &config.expected_tables).await?;
    let cardinality = check_minimum_cardinality(conn, &config.cardinality).await;
    let invariants = check_invariants(conn, &config.invariants).await;

    let report = HarnessReport {
        schema,
        cardinality,
        invariants,
    };
    info!(
        event = "harness_finished",
        passed = report.passed(),
        missing_tables = report.schema.missing.len(),
        failed_checks = report.failed_checks().count(),
    );
    Ok(report)
}

async fn scalar(conn: &mut SqliteConnection, query: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(query).fetch_one(&mut *conn).await
}

fn failed_query(label: &str, expected: String, err: sqlx::Error) -> CheckOutcome {
    warn!(event = "check_query_failed", check = label, error = %err);
    CheckOutcome {
        label: label.to_string(),
        actual: None,
        expected,
        passed: false,
        error: Some(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_band_query_follows_stat_bands() {
        let query = class_bands_query();
        for class in CharacterClass::ALL {
            let health = class.stat_bands().health;
            assert!(query.contains(&format!(
                "class = '{class}' AND health BETWEEN {} AND {}",
                health.min, health.max
            )));
        }
    }

    #[test]
    fn every_default_invariant_is_labelled_once() {
        let checks = default_invariant_checks();
        let labels: BTreeSet<&str> = checks.iter().map(|check| check.label.as_str()).collect();
        assert_eq!(labels.len(), checks.len());
        assert_eq!(checks.len(), 10);
    }
}
