//! # Tabula
//!
//! A model-driven dynamic schema and SQL engine.
//!
//! Tabula turns declarative model definitions (JSON documents describing a
//! record type's fields, constraints, defaults and indexing hints) into
//! dialect-specific DDL and parameterized CRUD statements, with a
//! composable condition algebra for filtering.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabula_orm::prelude::*;
//!
//! let mut registry = DialectRegistry::new();
//! registry.register(Arc::new(MysqlDialect::new()));
//!
//! let engine = Engine::connect(db, &registry, "mysql")?;
//! engine.register(r#"{
//!     "code": "user",
//!     "fields": [
//!         {"name": "id", "type": "id"},
//!         {"name": "userName", "type": "string", "required": true, "unique": true},
//!         {"name": "age", "type": "int"}
//!     ]
//! }"#)?;
//! engine.migrate_all()?;
//!
//! let adults = engine.find(
//!     "user",
//!     &Condition::new().with("age gte", 18).with("order_by", "userName"),
//!     &[],
//! )?;
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

/// Model documents, the schema model and name casing.
pub mod schema {
    pub use tabula_schema::*;
}

/// Condition algebra and the dialect contract.
pub mod query {
    pub use tabula_query::*;
}

/// The MySQL reference dialect.
pub mod mysql {
    pub use tabula_mysql::*;
}

/// The schema registry and CRUD/migration engine.
pub mod engine {
    pub use tabula_engine::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{Database, DialectRegistry, Engine, EngineError, Transaction};
    pub use crate::mysql::MysqlDialect;
    pub use crate::query::{Compiler, Condition, Record, SqlFlavor, Value};
    pub use crate::schema::{ModelDocument, Schema, SchemaError};
}

// Re-export key types at the crate root
pub use engine::{Engine, EngineError};
pub use query::{Condition, Record, Value};
pub use schema::{Schema, SchemaError};
