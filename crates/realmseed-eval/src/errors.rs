use thiserror::Error;

/// Errors emitted by the validation harness.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("database error: {0}")]
    Db(String),
    #[error("introspection failed: {0}")]
    Introspect(#[from] realmseed_core::Error),
}
