//! Fixture generation for the Realmseed game-state store.
//!
//! A [`GenerationEngine`] runs an ordered [`Pipeline`] of phases against a
//! single SQLite connection. Root phases (characters, quests, levels) fill the
//! entity pools; dependent phases draw from those pools and from the
//! reference data loaded by `init`. Every phase commits as one transaction and
//! draws from its own seeded random stream, so a run is reproducible from its
//! seed, base time, and plan.

pub mod engine;
pub mod errors;
pub mod generators;
pub mod ids;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod pool;
pub mod resolver;
pub mod session;
pub mod template;
pub mod vocab;

pub use engine::GenerationEngine;
pub use errors::GenerationError;
pub use loader::{OpenMode, apply_script, open_store};
pub use model::{GenerationIssue, GenerationReport, PhaseReport, RowCounts};
pub use pipeline::{PhaseKind, Pipeline};
pub use pool::{CharacterRef, EntityPools, PoolKind, QuestRef};
pub use session::GenerationSession;
pub use template::{TemplateError, TokenSet, render, render_json, render_value};
