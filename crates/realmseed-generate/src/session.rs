use chrono::{Duration, NaiveDateTime};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ids::hash_seed;
use crate::model::{GenerationIssue, GenerationReport};
use crate::pool::EntityPools;

/// Stored timestamp format for every generated date.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// State owned by one generation run and passed to every phase.
#[derive(Debug)]
pub struct GenerationSession {
    seed: u64,
    base_time: NaiveDateTime,
    pub pools: EntityPools,
    pub report: GenerationReport,
}

impl GenerationSession {
    pub fn new(run_id: String, seed: u64, base_time: NaiveDateTime) -> Self {
        Self {
            seed,
            base_time,
            pools: EntityPools::default(),
            report: GenerationReport::new(run_id, seed, format_timestamp(base_time)),
        }
    }

    pub fn base_time(&self) -> NaiveDateTime {
        self.base_time
    }

    /// Random stream dedicated to one phase.
    pub fn phase_rng(&self, phase: &str) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(hash_seed(self.seed, phase))
    }

    /// A timestamp up to `max_seconds` before the base time.
    pub fn time_before<R: Rng + ?Sized>(&self, rng: &mut R, max_seconds: i64) -> NaiveDateTime {
        self.base_time - Duration::seconds(rng.random_range(0..=max_seconds))
    }

    pub fn record_issue(&mut self, issue: GenerationIssue) {
        self.report.record_issue(issue);
    }
}
