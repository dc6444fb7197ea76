//! The external database contract.
//!
//! The engine never owns a connection; it consumes whatever transport the
//! caller provides through these traits. All execution is synchronous and
//! blocking; deadlines and cancellation are the caller's concern, imposed
//! around these calls.

use thiserror::Error;

use tabula_query::value::{Record, Value};

/// Opaque failure reported by the underlying database transport.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DatabaseError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DatabaseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Something that can run statements: a connection or an open transaction.
pub trait Executor {
    /// Run a statement, returning the number of rows affected.
    fn execute(&mut self, sql: &str, args: &[Value]) -> Result<u64, DatabaseError>;

    /// Run a query, returning result rows as storage-keyed records.
    fn query(&mut self, sql: &str, args: &[Value]) -> Result<Vec<Record>, DatabaseError>;
}

/// An open transaction. Dropping without commit is expected to roll back,
/// but callers should call one of the two explicitly.
pub trait Transaction: Executor {
    fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
    fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// A database handle.
pub trait Database: Send + Sync {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, DatabaseError>;

    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Record>, DatabaseError>;

    /// Open a transaction scoped to this handle.
    fn begin(&self) -> Result<Box<dyn Transaction + '_>, DatabaseError>;
}

impl<D: Database> Database for std::sync::Arc<D> {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, DatabaseError> {
        (**self).execute(sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Record>, DatabaseError> {
        (**self).query(sql, args)
    }

    fn begin(&self) -> Result<Box<dyn Transaction + '_>, DatabaseError> {
        (**self).begin()
    }
}

/// Adapter letting a bare [`Database`] stand in where an [`Executor`] is
/// expected (non-transactional execution).
pub struct Direct<'a, D: Database>(pub &'a D);

impl<D: Database> Executor for Direct<'_, D> {
    fn execute(&mut self, sql: &str, args: &[Value]) -> Result<u64, DatabaseError> {
        self.0.execute(sql, args)
    }

    fn query(&mut self, sql: &str, args: &[Value]) -> Result<Vec<Record>, DatabaseError> {
        self.0.query(sql, args)
    }
}
