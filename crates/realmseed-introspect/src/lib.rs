//! Store introspection adapters.

pub mod adapter;
pub mod options;
pub mod sqlite;

pub use adapter::Adapter;
pub use options::IntrospectOptions;
pub use sqlite::{SqliteAdapter, introspect_sqlite, introspect_sqlite_with_options};

pub use realmseed_core::StoreSnapshot;
