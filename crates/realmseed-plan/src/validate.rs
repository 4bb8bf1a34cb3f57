use jsonschema::JSONSchema;
use serde_json::Value;

use crate::errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
use crate::model::SeedPlan;

/// Upper bound on rows per phase; larger plans are almost always typos.
pub const MAX_ROWS_PER_PHASE: u32 = 1_000_000;

/// Validated plan with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedPlan {
    pub plan: SeedPlan,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a plan JSON document against the plan JSON Schema.
pub fn validate_plan_json(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidationReport, PlanError> {
    let compiled =
        JSONSchema::compile(plan_schema).map_err(|err| PlanError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(plan_json) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_violation",
                path,
                error.to_string(),
                None,
            ));
        }
    }

    Ok(report)
}

/// Check relationships between phase counts.
pub fn validate_plan_semantics(plan: &SeedPlan) -> ValidationReport {
    let mut report = ValidationReport::default();
    let counts = &plan.counts;

    let phases = [
        ("characters", counts.characters),
        ("quests", counts.quests),
        ("levels", counts.levels),
        ("battle_records", counts.battle_records),
        ("quest_progress", counts.quest_progress),
        ("level_progress", counts.level_progress),
        ("achievements", counts.achievements),
        ("save_slots", counts.save_slots),
        ("logs", counts.logs),
    ];
    for (name, rows) in phases {
        if rows > MAX_ROWS_PER_PHASE {
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "count_too_large",
                format!("/counts/{name}"),
                format!("{rows} rows requested, limit is {MAX_ROWS_PER_PHASE}"),
                Some("split the run into several seed invocations".into()),
            ));
        }
    }

    if counts.characters == 0 {
        let dependents = [
            ("save_slots", counts.save_slots),
            ("battle_records", counts.battle_records),
            ("quest_progress", counts.quest_progress),
            ("level_progress", counts.level_progress),
            ("achievements", counts.achievements),
        ];
        for (name, rows) in dependents {
            if rows > 0 {
                report.push_warning(ValidationIssue::new(
                    IssueSeverity::Warning,
                    "dependents_without_characters",
                    format!("/counts/{name}"),
                    format!("{rows} {name} requested but no characters are generated"),
                    Some("rows are only written when the store already holds characters".into()),
                ));
            }
        }
    }

    check_pairs(
        &mut report,
        "quest_progress",
        counts.quest_progress,
        counts.characters,
        counts.quests,
    );
    check_pairs(
        &mut report,
        "level_progress",
        counts.level_progress,
        counts.characters,
        counts.levels,
    );

    report
}

fn check_pairs(report: &mut ValidationReport, name: &str, requested: u32, left: u32, right: u32) {
    if left == 0 || right == 0 {
        return;
    }
    let available = u64::from(left) * u64::from(right);
    if u64::from(requested) > available {
        report.push_warning(ValidationIssue::new(
            IssueSeverity::Warning,
            "count_exceeds_pairs",
            format!("/counts/{name}"),
            format!("{requested} rows requested but only {available} distinct pairs exist"),
            Some("the phase writes at most one row per pair".into()),
        ));
    }
}

/// Validate the plan end-to-end, returning structured issues on failure.
pub fn validate_plan(
    plan_json: &Value,
    plan_schema: &Value,
) -> Result<ValidatedPlan, ValidationReport> {
    let structural = match validate_plan_json(plan_json, plan_schema) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "schema_validation_error",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let plan: SeedPlan = match serde_json::from_value(plan_json.clone()) {
        Ok(plan) => plan,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push_error(ValidationIssue::new(
                IssueSeverity::Error,
                "invalid_plan_json",
                "/",
                err.to_string(),
                None,
            ));
            return Err(report);
        }
    };

    let semantic = validate_plan_semantics(&plan);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    Ok(ValidatedPlan {
        plan,
        warnings: semantic.warnings,
    })
}

fn normalized_json_pointer(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}
