//! Engine error taxonomy.

use thiserror::Error;

use tabula_query::dialect::BuildError;
use tabula_schema::SchemaError;

use crate::db::DatabaseError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the engine. None of these are retried internally;
/// every failure propagates to the caller exactly once.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Operation on a schema name that was never registered, where absence
    /// cannot be silently treated as a no-op.
    #[error("schema `{0}` is not registered")]
    SchemaNotRegistered(String),

    /// No dialect registered under the requested driver name.
    #[error("dialect `{0}` is not supported")]
    DialectNotSupported(String),

    /// DELETE attempted without any filter. Deleting a whole table through
    /// this path is deliberately disallowed.
    #[error("delete requires a non-empty condition")]
    EmptyDeleteCondition,

    /// Model document parsing or validation failure.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Statement building failure (strict condition mode, empty insert).
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Passthrough from the underlying database transport.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),
}
