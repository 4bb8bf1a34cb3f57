use thiserror::Error;

use crate::template::TemplateError;

/// Errors emitted while preparing or seeding a store.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("cannot open store: {0}")]
    Connection(String),
    #[error("script execution failed: {0}")]
    Script(String),
    #[error("phase '{phase}' failed: {message}")]
    Write { phase: String, message: String },
    #[error("store does not match the catalog: {0}")]
    Contract(String),
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("invalid plan: {0}")]
    InvalidPlan(String),
    #[error("invalid phase order: {0}")]
    Phase(String),
}

impl GenerationError {
    pub fn write(phase: &str, message: impl Into<String>) -> Self {
        Self::Write {
            phase: phase.to_string(),
            message: message.into(),
        }
    }
}

/// Maps any displayable store error into a [`GenerationError::Write`] for `phase`.
pub(crate) fn write_error<E: std::fmt::Display>(phase: &'static str) -> impl Fn(E) -> GenerationError {
    move |err| GenerationError::write(phase, err.to_string())
}
