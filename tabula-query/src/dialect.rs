//! The dialect contract: DDL and DML text generation for one target
//! database product.
//!
//! Implementations receive already-storage-cased identifiers and produce
//! `(sql, bound_args)` pairs ready for execution. The engine layer owns
//! external↔storage name translation and policy checks (such as refusing
//! an unconditional DELETE); dialects only render text.

use thiserror::Error;

use tabula_schema::{FieldType, Schema};

use crate::condition::{Condition, ConditionError};
use crate::sql::SqlFlavor;
use crate::value::{Record, Value};

/// Result type for statement building.
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors from statement building.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Condition(#[from] ConditionError),

    /// `build_insert` called with no rows.
    #[error("insert requires at least one row")]
    EmptyInsert,
}

/// A generated statement and its bound arguments, in placeholder order.
pub type Statement = (String, Vec<Value>);

/// SQL generation for one target database dialect.
pub trait Dialect: Send + Sync {
    /// Driver name this dialect registers under (e.g. `"mysql"`).
    fn name(&self) -> &'static str;

    /// Placeholder and quoting conventions.
    fn flavor(&self) -> SqlFlavor;

    /// Column-type keyword for an abstract field type. Total over the
    /// closed type set; unknown type names are rejected at schema parse
    /// time instead.
    fn data_type_of(&self, field_type: FieldType) -> &'static str;

    /// Single-row, single-column query returning the active database name.
    fn current_database_sql(&self) -> String;

    /// Parameterized metadata probe returning the table name if present.
    /// Absence of a result row means "does not exist"; it is never an
    /// error.
    fn table_exists_sql(&self, table_name: &str, database: &str) -> Statement;

    /// `CREATE TABLE IF NOT EXISTS …` for the schema, including a
    /// (possibly composite) PRIMARY KEY clause when any field is a key.
    fn create_table_sql(&self, schema: &Schema) -> String;

    /// `DROP TABLE IF EXISTS …`.
    fn drop_table_sql(&self, schema: &Schema) -> String;

    /// Multi-row INSERT. Column set and order come from the schema's
    /// declared field order, never from any one row's key order; columns a
    /// row omits bind as SQL NULL.
    fn build_insert(&self, schema: &Schema, rows: &[Record]) -> BuildResult<Statement>;

    /// SELECT with compiled WHERE plus the reserved `order_by`,
    /// `group_by`, `having`, `limit` and `offset` keys of the condition.
    fn build_select(
        &self,
        table_name: &str,
        columns: &[String],
        condition: &Condition,
    ) -> BuildResult<Statement>;

    /// UPDATE … SET with compiled WHERE. SET columns are emitted in
    /// lexicographic order for deterministic text.
    fn build_update(
        &self,
        table_name: &str,
        set: &Record,
        condition: &Condition,
    ) -> BuildResult<Statement>;

    /// DELETE with compiled WHERE. Refusing an empty condition is the
    /// engine's responsibility, not the dialect's.
    fn build_delete(&self, table_name: &str, condition: &Condition) -> BuildResult<Statement>;

    /// `SELECT COUNT(*)` with compiled WHERE.
    fn build_count(&self, table_name: &str, condition: &Condition) -> BuildResult<Statement>;
}
