//! # tabula-engine
//!
//! The schema registry and CRUD/migration engine for Tabula.
//!
//! This crate provides:
//! - [`Database`]/[`Transaction`]: the contract the external transport
//!   satisfies (synchronous `execute`/`query` plus transactions)
//! - [`DialectRegistry`]: explicit driver-name → dialect lookup
//! - [`Engine`]: concurrent schema registry plus migration and CRUD
//!   orchestration with external↔storage name translation
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tabula_engine::{DialectRegistry, Engine};
//! use tabula_mysql::MysqlDialect;
//!
//! let mut registry = DialectRegistry::new();
//! registry.register(Arc::new(MysqlDialect::new()));
//!
//! let engine = Engine::connect(db, &registry, "mysql")?;
//! engine.register(user_model_json)?;
//! engine.migrate_all()?;
//!
//! let found = engine.find(
//!     "user",
//!     &tabula_query::Condition::new().with("age gt", 18),
//!     &[],
//! )?;
//! ```

pub mod db;
pub mod engine;
pub mod error;
pub mod registry;

pub use db::{Database, DatabaseError, Direct, Executor, Transaction};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use registry::DialectRegistry;
