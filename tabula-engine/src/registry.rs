//! Explicit dialect registry.
//!
//! Built once at startup and passed by reference into engine
//! construction; there is no global mutable dialect table, which keeps
//! tests free to register fakes.

use std::collections::HashMap;
use std::sync::Arc;

use tabula_query::dialect::Dialect;

/// Maps driver names to dialect implementations.
#[derive(Default, Clone)]
pub struct DialectRegistry {
    dialects: HashMap<String, Arc<dyn Dialect>>,
}

impl DialectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dialect under its own [`Dialect::name`]. Re-registering
    /// a name replaces the previous implementation.
    pub fn register(&mut self, dialect: Arc<dyn Dialect>) {
        self.dialects.insert(dialect.name().to_string(), dialect);
    }

    pub fn get(&self, driver: &str) -> Option<Arc<dyn Dialect>> {
        self.dialects.get(driver).cloned()
    }

    pub fn drivers(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("drivers", &self.dialects.keys().collect::<Vec<_>>())
            .finish()
    }
}
