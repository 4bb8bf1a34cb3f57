use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rows written per table.
pub type RowCounts = BTreeMap<String, u64>;

/// Summary of one pipeline phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: String,
    pub rows_requested: u64,
    pub rows_written: RowCounts,
    pub duration_ms: u64,
}

impl PhaseReport {
    pub fn total_written(&self) -> u64 {
        self.rows_written.values().sum()
    }
}

/// Structured generation issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationIssue {
    pub level: String,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl GenerationIssue {
    pub fn warning(phase: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            level: "warning".to_string(),
            code: code.to_string(),
            message: message.into(),
            phase: Some(phase.to_string()),
        }
    }

    pub fn info(phase: &str, code: &str, message: impl Into<String>) -> Self {
        Self {
            level: "info".to_string(),
            ..Self::warning(phase, code, message)
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub base_time: String,
    pub phases: Vec<PhaseReport>,
    pub issues: Vec<GenerationIssue>,
    pub issues_by_code: BTreeMap<String, u64>,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64, base_time: String) -> Self {
        Self {
            run_id,
            seed,
            base_time,
            phases: Vec::new(),
            issues: Vec::new(),
            issues_by_code: BTreeMap::new(),
            duration_ms: 0,
        }
    }

    pub fn record_issue(&mut self, issue: GenerationIssue) {
        *self.issues_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.issues.push(issue);
    }

    pub fn issue_count(&self, code: &str) -> u64 {
        self.issues_by_code.get(code).copied().unwrap_or(0)
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseReport> {
        self.phases.iter().find(|phase| phase.phase == name)
    }

    /// Rows written to `table` across every phase.
    pub fn rows_written(&self, table: &str) -> u64 {
        self.phases
            .iter()
            .filter_map(|phase| phase.rows_written.get(table))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issues_are_counted_by_code() {
        let mut report = GenerationReport::new("run".into(), 1, "2024-01-01 00:00:00".into());
        report.record_issue(GenerationIssue::warning("loadouts", "constraint_unsatisfiable", "a"));
        report.record_issue(GenerationIssue::warning("loadouts", "constraint_unsatisfiable", "b"));
        report.record_issue(GenerationIssue::info("save_slots", "no_player_character", "c"));
        assert_eq!(report.issue_count("constraint_unsatisfiable"), 2);
        assert_eq!(report.issue_count("missing"), 0);
        assert_eq!(report.issues[2].level, "info");
    }
}
