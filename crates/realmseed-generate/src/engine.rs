use std::time::Instant;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use rand::Rng;
use sqlx::SqliteConnection;
use tracing::{info, warn};

use realmseed_core::{CATALOG, verify_store_contract};
use realmseed_introspect::introspect_sqlite;
use realmseed_plan::{SeedPlan, validate_plan_semantics};

use crate::errors::{GenerationError, write_error};
use crate::model::{GenerationReport, PhaseReport};
use crate::pipeline::Pipeline;
use crate::session::GenerationSession;

/// Entry point for seeding a store from a plan.
#[derive(Debug, Clone, Default)]
pub struct GenerationEngine {
    pipeline: Pipeline,
}

impl GenerationEngine {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Check the store against the catalog, then run every phase in order.
    ///
    /// Each phase commits on its own; when one fails the run stops and the
    /// phases before it stay committed.
    pub async fn run(
        &self,
        conn: &mut SqliteConnection,
        plan: &SeedPlan,
    ) -> Result<GenerationReport, GenerationError> {
        let start = Instant::now();

        let validation = validate_plan_semantics(plan);
        if !validation.is_ok() {
            return Err(GenerationError::InvalidPlan(validation.summary()));
        }

        let snapshot = introspect_sqlite(conn)
            .await
            .map_err(|err| GenerationError::Connection(err.to_string()))?;
        verify_store_contract(CATALOG, &snapshot)
            .into_result()
            .map_err(|err| GenerationError::Contract(err.to_string()))?;

        let seed = plan.seed.unwrap_or_else(|| rand::rng().random());
        let base_time = plan.base_time.unwrap_or_else(now);
        let run_id = uuid::Uuid::new_v4().to_string();
        let mut session = GenerationSession::new(run_id.clone(), seed, base_time);

        info!(
            event = "generation_started",
            run_id = %run_id,
            seed,
            base_time = %session.report.base_time,
            phases = self.pipeline.phases().len(),
        );

        for phase in self.pipeline.phases() {
            let name = phase.name();
            let phase_start = Instant::now();

            let mut pools = phase.reads().to_vec();
            pools.extend_from_slice(phase.writes());
            session
                .pools
                .reload(conn, &pools)
                .await
                .map_err(write_error(name))?;

            let rows_requested = match phase.requested(&plan.counts) {
                Some(rows) => u64::from(rows),
                None => session.pools.characters.len() as u64,
            };
            info!(event = "phase_started", phase = name, rows_requested);

            let rows_written = match phase.run(conn, &mut session, &plan.counts).await {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(
                        event = "phase_failed",
                        run_id = %run_id,
                        phase = name,
                        error = %err,
                    );
                    return Err(err);
                }
            };

            let report = PhaseReport {
                phase: name.to_string(),
                rows_requested,
                rows_written,
                duration_ms: phase_start.elapsed().as_millis() as u64,
            };
            info!(
                event = "phase_finished",
                phase = name,
                rows_written = report.total_written(),
                duration_ms = report.duration_ms,
            );
            session.report.phases.push(report);
        }

        let mut report = session.report;
        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            event = "generation_finished",
            run_id = %run_id,
            phases = report.phases.len(),
            issues = report.issues.len(),
            duration_ms = report.duration_ms,
        );
        Ok(report)
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc().trunc_subsecs(0)
}
