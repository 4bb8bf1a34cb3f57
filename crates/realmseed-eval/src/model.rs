use serde::{Deserialize, Serialize};

/// Live table set compared with the expected one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaReport {
    pub expected_count: usize,
    pub found_count: usize,
    pub missing: Vec<String>,
    /// Present in the store but not expected; reported, never fatal.
    pub extra: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl SchemaReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Outcome of one query-based check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub label: String,
    /// Value returned by the query; `None` when the query failed.
    pub actual: Option<i64>,
    pub expected: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of a full harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessReport {
    pub schema: SchemaReport,
    pub cardinality: Vec<CheckOutcome>,
    pub invariants: Vec<CheckOutcome>,
}

impl HarnessReport {
    pub fn passed(&self) -> bool {
        self.schema.passed()
            && self.cardinality.iter().all(|check| check.passed)
            && self.invariants.iter().all(|check| check.passed)
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.cardinality
            .iter()
            .chain(self.invariants.iter())
            .filter(|check| !check.passed)
    }
}
