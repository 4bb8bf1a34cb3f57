use crate::model::{CheckOutcome, HarnessReport};
use crate::stats::StoreStats;

/// Human-readable harness report.
pub fn render_harness_report(report: &HarnessReport) -> String {
    let mut lines = Vec::new();

    lines.push("== Schema ==".to_string());
    lines.push(format!(
        "expected tables: {}, found: {}",
        report.schema.expected_count, report.schema.found_count
    ));
    if report.schema.missing.is_empty() {
        lines.push("[ok] all expected tables present".to_string());
    } else {
        lines.push(format!(
            "[fail] missing tables: {}",
            report.schema.missing.join(", ")
        ));
    }
    if !report.schema.extra.is_empty() {
        lines.push(format!("[warn] extra tables: {}", report.schema.extra.join(", ")));
    }
    if let Some(fingerprint) = &report.schema.fingerprint {
        lines.push(format!("fingerprint: {fingerprint}"));
    }
    lines.push(String::new());

    lines.push("== Cardinality ==".to_string());
    push_checks(&mut lines, &report.cardinality);
    lines.push(String::new());

    lines.push("== Invariants ==".to_string());
    push_checks(&mut lines, &report.invariants);
    lines.push(String::new());

    let total = 1 + report.cardinality.len() + report.invariants.len();
    let failed = report.failed_checks().count() + usize::from(!report.schema.passed());
    lines.push(format!(
        "result: {} ({}/{} checks passed)",
        if report.passed() { "PASSED" } else { "FAILED" },
        total - failed,
        total
    ));

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn push_checks(lines: &mut Vec<String>, checks: &[CheckOutcome]) {
    for check in checks {
        let status = if check.passed { "ok" } else { "fail" };
        match (&check.actual, &check.error) {
            (_, Some(error)) => {
                lines.push(format!("[{status}] {}: query failed: {error}", check.label))
            }
            (Some(actual), None) => lines.push(format!(
                "[{status}] {}: {actual} (expected {})",
                check.label, check.expected
            )),
            (None, None) => lines.push(format!("[{status}] {}", check.label)),
        }
    }
}

/// Human-readable store statistics.
pub fn render_stats(stats: &StoreStats) -> String {
    let mut lines = Vec::new();

    lines.push("== Row counts ==".to_string());
    let width = stats
        .tables
        .iter()
        .map(|count| count.table.len())
        .max()
        .unwrap_or(0);
    for count in &stats.tables {
        let rows = count
            .rows
            .map(|rows| rows.to_string())
            .unwrap_or_else(|| "missing".to_string());
        lines.push(format!("{:<width$}  {rows}", count.table));
    }

    for distribution in &stats.distributions {
        lines.push(String::new());
        lines.push(format!("== {} ==", distribution.label));
        if distribution.values.is_empty() {
            lines.push("(none)".to_string());
        }
        for (value, rows) in &distribution.values {
            lines.push(format!("{value}: {rows}"));
        }
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}
