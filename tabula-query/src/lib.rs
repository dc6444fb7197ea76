//! # tabula-query
//!
//! Condition algebra and the dialect SQL-generation contract for Tabula.
//!
//! This crate provides:
//! - [`Value`] and [`Record`]: generic scalar values and name→value rows
//! - [`Condition`]: an ordered, recursive condition map
//! - [`Compiler`]: deterministic compilation of conditions into SQL
//!   predicates and positional bound arguments
//! - [`Dialect`]: the contract every per-database SQL builder satisfies
//!
//! ## Conditions
//!
//! ```rust
//! use tabula_query::{Compiler, Condition, SqlFlavor};
//!
//! let cond = Condition::new()
//!     .with("age gt", 18)
//!     .with("status", vec!["active", "pending"]);
//!
//! let out = Compiler::new(SqlFlavor::MySql).compile(&cond).unwrap();
//! assert_eq!(out.predicates, vec!["age > ?", "status IN (?, ?)"]);
//! assert_eq!(out.params.len(), 3);
//! ```
//!
//! Malformed entries (a `between` with one element, an `or` whose value is
//! not a nested map) are dropped by the default lenient compiler for
//! compatibility with existing documents; [`Compiler::strict`] surfaces
//! them as [`ConditionError`]s instead.

pub mod condition;
pub mod dialect;
pub mod sql;
pub mod value;

pub use condition::{
    Compiled, Compiler, Condition, ConditionError, ConditionResult, ConditionValue, Operator,
    RESERVED_KEYS,
};
pub use dialect::{BuildError, BuildResult, Dialect, Statement};
pub use sql::SqlFlavor;
pub use value::{Record, Value, record_from_json};
