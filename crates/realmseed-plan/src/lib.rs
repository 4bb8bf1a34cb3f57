//! Seed plan contracts, loading, and validation.
//!
//! A seed plan says how many rows each generation phase writes, and
//! optionally pins the random seed and the timestamp every generated date is
//! anchored to.

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, ValidationIssue, ValidationReport};
pub use load::{load_plan, parse_plan_json, parse_plan_toml};
pub use model::{PhaseCounts, SeedPlan};
pub use schema::plan_json_schema;
pub use validate::{ValidatedPlan, validate_plan, validate_plan_json, validate_plan_semantics};
