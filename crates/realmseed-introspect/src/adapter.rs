use async_trait::async_trait;

use realmseed_core::{Result, StoreSnapshot};

use crate::options::IntrospectOptions;

/// Trait implemented by store adapters that can introspect their layout.
#[async_trait]
pub trait Adapter {
    /// Returns the engine identifier (e.g. `sqlite`).
    fn engine(&self) -> &'static str;

    /// Introspect the store and return a snapshot.
    async fn introspect(&mut self, opts: &IntrospectOptions) -> Result<StoreSnapshot>;
}
