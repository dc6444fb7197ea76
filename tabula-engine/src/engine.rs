//! The schema registry and CRUD/migration engine.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use tabula_query::condition::{Compiler, Condition};
use tabula_query::dialect::{BuildError, Dialect};
use tabula_query::value::{Record, Value};
use tabula_schema::casing::{to_external, to_storage};
use tabula_schema::{DocumentValidator, Schema, SchemaError};

use crate::db::{Database, Direct, Executor};
use crate::error::{EngineError, EngineResult};
use crate::registry::DialectRegistry;

/// Owns the registered schemas and orchestrates migration and CRUD
/// against an external database handle.
///
/// The schema map is guarded by a reader/writer lock: lookups proceed
/// concurrently, registration is exclusive. [`Engine::migrate_all`] is not
/// itself serialized against concurrent `register` or another
/// `migrate_all`; callers that migrate while registering must serialize
/// those externally.
pub struct Engine<D: Database> {
    db: D,
    dialect: Arc<dyn Dialect>,
    current_database: String,
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
    validator: Option<Box<dyn DocumentValidator>>,
}

impl<D: Database> std::fmt::Debug for Engine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("current_database", &self.current_database)
            .finish_non_exhaustive()
    }
}

impl<D: Database> Engine<D> {
    /// Build an engine over an explicit dialect. Fetches the current
    /// database name once; it is cached for the engine's lifetime.
    pub fn new(db: D, dialect: Arc<dyn Dialect>) -> EngineResult<Self> {
        let sql = dialect.current_database_sql();
        let rows = db.query(&sql, &[])?;
        let current_database = rows
            .first()
            .and_then(|row| row.values().next())
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        Ok(Self {
            db,
            dialect,
            current_database,
            schemas: RwLock::new(HashMap::new()),
            validator: None,
        })
    }

    /// Build an engine by driver name, looked up in the given registry.
    pub fn connect(db: D, registry: &DialectRegistry, driver: &str) -> EngineResult<Self> {
        let dialect = registry
            .get(driver)
            .ok_or_else(|| EngineError::DialectNotSupported(driver.to_string()))?;
        Self::new(db, dialect)
    }

    /// Run every registered document through this validator before
    /// parsing.
    pub fn with_validator(mut self, validator: Box<dyn DocumentValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// The database name cached at construction.
    pub fn current_database(&self) -> &str {
        &self.current_database
    }

    /// Parse a model definition and install it under its name.
    ///
    /// Re-registering a name replaces the previous schema (last writer
    /// wins); registration is idempotent.
    pub fn register(&self, definition: &str) -> EngineResult<String> {
        if let Some(validator) = &self.validator {
            validator
                .validate(definition)
                .map_err(|errors| SchemaError::ValidationFailed { errors })?;
        }
        let schema = Schema::parse(definition)?;
        let name = schema.name.clone();
        self.schemas
            .write()
            .insert(name.clone(), Arc::new(schema));
        info!(schema = %name, "registered model");
        Ok(name)
    }

    /// Look up a registered schema. Absence is not an error.
    pub fn get_schema(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Snapshot of all registered schemas.
    pub fn schemas(&self) -> HashMap<String, Arc<Schema>> {
        self.schemas.read().clone()
    }

    fn require_schema(&self, name: &str) -> EngineResult<Arc<Schema>> {
        self.get_schema(name)
            .ok_or_else(|| EngineError::SchemaNotRegistered(name.to_string()))
    }

    /// Whether the schema's table exists in the current database.
    pub fn table_exists(&self, name: &str) -> EngineResult<bool> {
        let schema = self.require_schema(name)?;
        self.table_exists_via(&mut Direct(&self.db), &schema)
    }

    fn table_exists_via<E: Executor + ?Sized>(
        &self,
        exec: &mut E,
        schema: &Schema,
    ) -> EngineResult<bool> {
        let (sql, args) = self
            .dialect
            .table_exists_sql(&schema.table_name, &self.current_database);
        // A missing row means "absent", never an error.
        let rows = exec.query(&sql, &args)?;
        Ok(!rows.is_empty())
    }

    /// Create the schema's table if it does not exist. No-op for unknown
    /// names and for tables that already exist; existing tables are never
    /// inspected or altered, so column drift goes undetected.
    pub fn migrate_table(&self, name: &str) -> EngineResult<()> {
        self.migrate_table_via(&mut Direct(&self.db), name)
    }

    fn migrate_table_via<E: Executor + ?Sized>(
        &self,
        exec: &mut E,
        name: &str,
    ) -> EngineResult<()> {
        let Some(schema) = self.get_schema(name) else {
            return Ok(());
        };
        if self.table_exists_via(exec, &schema)? {
            debug!(schema = %name, "table already exists, skipping create");
            return Ok(());
        }
        let sql = self.dialect.create_table_sql(&schema);
        debug!(schema = %name, %sql, "creating table");
        exec.execute(&sql, &[])?;
        Ok(())
    }

    /// Migrate every registered schema inside one transaction; any single
    /// failure rolls the whole batch back.
    pub fn migrate_all(&self) -> EngineResult<()> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        if names.is_empty() {
            return Ok(());
        }
        names.sort();
        let mut tx = self.db.begin()?;
        let mut run = || -> EngineResult<()> {
            for name in &names {
                self.migrate_table_via(&mut *tx, name)?;
            }
            Ok(())
        };
        match run() {
            Ok(()) => {
                tx.commit()?;
                info!(count = names.len(), "migrated all registered schemas");
                Ok(())
            }
            Err(err) => {
                // Roll back the whole batch; the original error wins.
                let _ = tx.rollback();
                Err(err)
            }
        }
    }

    /// Drop the schema's table. No-op for unknown names.
    pub fn drop_table(&self, name: &str) -> EngineResult<()> {
        let Some(schema) = self.get_schema(name) else {
            return Ok(());
        };
        let sql = self.dialect.drop_table_sql(&schema);
        debug!(schema = %name, %sql, "dropping table");
        self.db.execute(&sql, &[])?;
        Ok(())
    }

    /// Insert one or more external-keyed records. Returns rows affected.
    pub fn insert(&self, name: &str, records: &[Record]) -> EngineResult<u64> {
        let schema = self.require_schema(name)?;
        let storage_rows: Vec<Record> = records.iter().map(storage_keyed).collect();
        let (sql, args) = self.dialect.build_insert(&schema, &storage_rows)?;
        debug!(schema = %name, %sql, "insert");
        Ok(self.db.execute(&sql, &args)?)
    }

    /// Query records matching the condition, returning external-keyed
    /// rows. An empty `columns` slice selects all schema columns.
    pub fn find(
        &self,
        name: &str,
        condition: &Condition,
        columns: &[String],
    ) -> EngineResult<Vec<Record>> {
        let schema = self.require_schema(name)?;
        let storage_columns: Vec<String> = if columns.is_empty() {
            schema.field_names.clone()
        } else {
            columns.iter().map(|c| to_storage(c)).collect()
        };
        let (sql, args) = self
            .dialect
            .build_select(&schema.table_name, &storage_columns, condition)?;
        debug!(schema = %name, %sql, "find");
        let rows = self.db.query(&sql, &args)?;
        Ok(rows.into_iter().map(external_keyed).collect())
    }

    /// Update matching records with the external-keyed `set` map.
    pub fn update(
        &self,
        name: &str,
        set: &Record,
        condition: &Condition,
    ) -> EngineResult<u64> {
        let schema = self.require_schema(name)?;
        let storage_set = storage_keyed(set);
        let (sql, args) = self
            .dialect
            .build_update(&schema.table_name, &storage_set, condition)?;
        debug!(schema = %name, %sql, "update");
        Ok(self.db.execute(&sql, &args)?)
    }

    /// Delete matching records. Fails with [`EngineError::EmptyDeleteCondition`]
    /// when the condition compiles to no predicates, so a map whose entries
    /// are all dropped by the lenient compiler cannot strip a whole table.
    pub fn delete(&self, name: &str, condition: &Condition) -> EngineResult<u64> {
        let schema = self.require_schema(name)?;
        let compiled = Compiler::new(self.dialect.flavor())
            .compile(condition)
            .map_err(BuildError::from)?;
        if compiled.predicates.is_empty() {
            return Err(EngineError::EmptyDeleteCondition);
        }
        let (sql, args) = self.dialect.build_delete(&schema.table_name, condition)?;
        debug!(schema = %name, %sql, "delete");
        Ok(self.db.execute(&sql, &args)?)
    }

    /// Count records matching the condition.
    pub fn count(&self, name: &str, condition: &Condition) -> EngineResult<u64> {
        let schema = self.require_schema(name)?;
        let (sql, args) = self.dialect.build_count(&schema.table_name, condition)?;
        debug!(schema = %name, %sql, "count");
        let rows = self.db.query(&sql, &args)?;
        let count = rows
            .first()
            .and_then(|row| row.values().next())
            .map(scalar_count)
            .unwrap_or(0);
        Ok(count)
    }

    /// The first record matching the condition, or `Ok(None)` when
    /// nothing matches. Implemented as `find` with an implicit limit of
    /// one, overriding any caller-supplied limit.
    pub fn first(
        &self,
        name: &str,
        condition: &Condition,
    ) -> EngineResult<Option<Record>> {
        let mut limited = condition.clone();
        limited.insert("limit", 1);
        let rows = self.find(name, &limited, &[])?;
        Ok(rows.into_iter().next())
    }
}

fn storage_keyed(record: &Record) -> Record {
    record
        .iter()
        .map(|(k, v)| (to_storage(k), v.clone()))
        .collect()
}

fn external_keyed(record: Record) -> Record {
    record
        .into_iter()
        .map(|(k, v)| (to_external(&k), v))
        .collect()
}

/// Drivers report COUNT(*) as whatever scalar shape they like: integer,
/// decimal, or stringified number.
fn scalar_count(value: &Value) -> u64 {
    match value {
        Value::Int(i) if *i >= 0 => *i as u64,
        Value::Float(f) if *f >= 0.0 => *f as u64,
        Value::String(s) => s.parse().unwrap_or(0),
        _ => 0,
    }
}
