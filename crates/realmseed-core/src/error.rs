use thiserror::Error;

/// Core error type shared across Realmseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// Database error or adapter failure.
    #[error("database error: {0}")]
    Db(String),
    /// The catalog violates internal invariants.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
    /// The live store does not match the catalog.
    #[error("store contract violated: {0}")]
    Contract(String),
    /// Catch-all error for unexpected failures.
    #[error("other error: {0}")]
    Other(String),
}

/// Convenience alias for results returned by Realmseed crates.
pub type Result<T> = std::result::Result<T, Error>;
