//! Validation harness and read-only statistics for a game-state store.

pub mod errors;
pub mod harness;
pub mod model;
pub mod report;
pub mod stats;

pub use errors::EvalError;
pub use harness::{
    CardinalityCheck, HarnessConfig, InvariantCheck, check_invariants, check_minimum_cardinality,
    check_schema, default_cardinality_checks, default_invariant_checks, run_harness,
};
pub use model::{CheckOutcome, HarnessReport, SchemaReport};
pub use report::{render_harness_report, render_stats};
pub use stats::{Distribution, StoreStats, TableCount, collect_stats};
