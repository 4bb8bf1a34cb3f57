/// Options that control how introspection behaves.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    /// Include SQLite bookkeeping tables such as `sqlite_sequence`.
    pub include_system_tables: bool,
    pub include_views: bool,
    /// Read column and foreign-key metadata for every table.
    pub include_columns: bool,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            include_system_tables: false,
            include_views: false,
            include_columns: true,
        }
    }
}
