use std::path::Path;

use serde_json::Value;

use crate::errors::{PlanError, Result};
use crate::model::SeedPlan;
use crate::schema::plan_json_schema;
use crate::validate::{ValidatedPlan, validate_plan, validate_plan_semantics};

/// Load and validate a plan from a `.json` or `.toml` file.
pub fn load_plan(path: &Path) -> Result<ValidatedPlan> {
    let parse = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_plan_json,
        Some("toml") => parse_plan_toml,
        other => {
            return Err(PlanError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            ));
        }
    };
    let contents = std::fs::read_to_string(path)?;
    parse(&contents)
}

/// Parse a JSON plan, checking it against the plan JSON Schema first.
pub fn parse_plan_json(contents: &str) -> Result<ValidatedPlan> {
    let plan_json: Value = serde_json::from_str(contents)?;
    let plan_schema = serde_json::to_value(plan_json_schema())?;
    validate_plan(&plan_json, &plan_schema).map_err(PlanError::Invalid)
}

/// Parse a TOML plan; serde enforces the structure.
pub fn parse_plan_toml(contents: &str) -> Result<ValidatedPlan> {
    let plan: SeedPlan = toml::from_str(contents)?;
    let report = validate_plan_semantics(&plan);
    if !report.is_ok() {
        return Err(PlanError::Invalid(report));
    }
    Ok(ValidatedPlan {
        plan,
        warnings: report.warnings,
    })
}
