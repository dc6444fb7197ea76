//! Integration tests for the engine against a scripted fake database.
//!
//! The fake records every statement it is handed and serves queued query
//! results, so these tests pin down the exact SQL and argument flow for
//! registration, migration (including transactional rollback) and CRUD.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use tabula_engine::db::{Database, DatabaseError, Executor, Transaction};
use tabula_engine::{DialectRegistry, Engine, EngineError};
use tabula_mysql::MysqlDialect;
use tabula_query::condition::Condition;
use tabula_query::value::{Record, Value};

const USER_MODEL: &str = r#"{
    "code": "user",
    "fields": [
        {"name": "id", "type": "id"},
        {"name": "username", "type": "string", "length": 64, "required": true},
        {"name": "age", "type": "int"}
    ]
}"#;

#[derive(Default)]
struct FakeDb {
    /// Every statement handed to the fake, in order, with a tag for the
    /// path it arrived through.
    log: Mutex<Vec<(String, String, Vec<Value>)>>,
    /// Queued responses served to `query` calls, oldest first; an empty
    /// queue serves empty result sets.
    query_results: Mutex<VecDeque<Vec<Record>>>,
    /// When set, `execute` fails for any statement containing this text.
    fail_execute_containing: Mutex<Option<String>>,
}

impl FakeDb {
    fn queue_result(&self, rows: Vec<Record>) {
        self.query_results.lock().push_back(rows);
    }

    fn fail_execute_containing(&self, needle: &str) {
        *self.fail_execute_containing.lock() = Some(needle.to_string());
    }

    fn logged(&self) -> Vec<(String, String, Vec<Value>)> {
        self.log.lock().clone()
    }

    fn statements(&self) -> Vec<String> {
        self.logged().into_iter().map(|(_, sql, _)| sql).collect()
    }

    fn run(&self, tag: &str, sql: &str, args: &[Value]) -> Result<u64, DatabaseError> {
        self.log
            .lock()
            .push((tag.to_string(), sql.to_string(), args.to_vec()));
        if tag.ends_with("execute") {
            if let Some(needle) = &*self.fail_execute_containing.lock() {
                if sql.contains(needle.as_str()) {
                    return Err(DatabaseError::new(format!("injected failure for {needle}")));
                }
            }
        }
        Ok(1)
    }

    fn serve_query(&self) -> Vec<Record> {
        self.query_results.lock().pop_front().unwrap_or_default()
    }
}

impl Database for FakeDb {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, DatabaseError> {
        self.run("execute", sql, args)
    }

    fn query(&self, sql: &str, args: &[Value]) -> Result<Vec<Record>, DatabaseError> {
        self.run("query", sql, args)?;
        Ok(self.serve_query())
    }

    fn begin(&self) -> Result<Box<dyn Transaction + '_>, DatabaseError> {
        self.run("begin", "BEGIN", &[])?;
        Ok(Box::new(FakeTx { db: self }))
    }
}

struct FakeTx<'a> {
    db: &'a FakeDb,
}

impl Executor for FakeTx<'_> {
    fn execute(&mut self, sql: &str, args: &[Value]) -> Result<u64, DatabaseError> {
        self.db.run("tx.execute", sql, args)
    }

    fn query(&mut self, sql: &str, args: &[Value]) -> Result<Vec<Record>, DatabaseError> {
        self.db.run("tx.query", sql, args)?;
        Ok(self.db.serve_query())
    }
}

impl Transaction for FakeTx<'_> {
    fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.db.run("commit", "COMMIT", &[])?;
        Ok(())
    }

    fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        self.db.run("rollback", "ROLLBACK", &[])?;
        Ok(())
    }
}

fn current_db_row() -> Vec<Record> {
    let mut row = Record::new();
    row.insert("DATABASE()".to_string(), Value::from("appdb"));
    vec![row]
}

fn exists_row(table: &str) -> Vec<Record> {
    let mut row = Record::new();
    row.insert("TABLE_NAME".to_string(), Value::from(table));
    vec![row]
}

fn new_engine(db: Arc<FakeDb>) -> Engine<Arc<FakeDb>> {
    db.queue_result(current_db_row());
    Engine::new(db, Arc::new(MysqlDialect::new())).unwrap()
}

#[test]
fn test_connect_caches_current_database() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    assert_eq!(engine.current_database(), "appdb");
    assert_eq!(db.statements(), vec!["SELECT DATABASE()"]);
}

#[test]
fn test_connect_unknown_driver() {
    let mut registry = DialectRegistry::new();
    registry.register(Arc::new(MysqlDialect::new()));
    let err = Engine::connect(Arc::new(FakeDb::default()), &registry, "oracle").unwrap_err();
    assert!(matches!(err, EngineError::DialectNotSupported(d) if d == "oracle"));
}

#[test]
fn test_register_and_lookup() {
    let engine = new_engine(Arc::new(FakeDb::default()));
    let name = engine.register(USER_MODEL).unwrap();
    assert_eq!(name, "user");
    assert!(engine.get_schema("user").is_some());
    assert!(engine.get_schema("ghost").is_none());
    assert_eq!(engine.schemas().len(), 1);

    // Re-registration replaces, never errors.
    engine.register(USER_MODEL).unwrap();
    assert_eq!(engine.schemas().len(), 1);
}

#[test]
fn test_table_exists_unknown_schema() {
    let engine = new_engine(Arc::new(FakeDb::default()));
    let err = engine.table_exists("ghost").unwrap_err();
    assert!(matches!(err, EngineError::SchemaNotRegistered(n) if n == "ghost"));
}

#[test]
fn test_table_exists_probe() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    db.queue_result(vec![]);
    assert!(!engine.table_exists("user").unwrap());

    db.queue_result(exists_row("user"));
    assert!(engine.table_exists("user").unwrap());

    let logged = db.logged();
    assert_eq!(
        logged[1].2,
        vec![Value::from("user"), Value::from("appdb")]
    );
}

#[test]
fn test_migrate_table_creates_when_absent() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    db.queue_result(vec![]);
    engine.migrate_table("user").unwrap();

    let creates: Vec<_> = db
        .statements()
        .into_iter()
        .filter(|s| s.starts_with("CREATE TABLE"))
        .collect();
    assert_eq!(creates.len(), 1);
    assert!(creates[0].starts_with("CREATE TABLE IF NOT EXISTS `user`"));
}

#[test]
fn test_migrate_table_is_idempotent() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    // First call: table absent, create issued. Second call: table present.
    db.queue_result(vec![]);
    engine.migrate_table("user").unwrap();
    db.queue_result(exists_row("user"));
    engine.migrate_table("user").unwrap();

    let creates = db
        .statements()
        .iter()
        .filter(|s| s.starts_with("CREATE TABLE"))
        .count();
    assert_eq!(creates, 1);
}

#[test]
fn test_migrate_table_unknown_schema_is_noop() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.migrate_table("ghost").unwrap();
    // Only the construction-time DATABASE() probe ran.
    assert_eq!(db.statements().len(), 1);
}

#[test]
fn test_migrate_all_commits_one_transaction() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();
    engine
        .register(r#"{"code": "tag", "fields": [{"name": "id", "type": "id"}]}"#)
        .unwrap();

    db.queue_result(vec![]);
    db.queue_result(vec![]);
    engine.migrate_all().unwrap();

    let tags: Vec<String> = db.logged().into_iter().map(|(tag, _, _)| tag).collect();
    let expected: Vec<String> =
        ["query", "begin", "tx.query", "tx.execute", "tx.query", "tx.execute", "commit"]
            .iter()
            .map(|s| s.to_string())
            .collect();
    assert_eq!(tags, expected);
}

#[test]
fn test_migrate_all_rolls_back_on_failure() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();
    engine
        .register(r#"{"code": "tag", "fields": [{"name": "id", "type": "id"}]}"#)
        .unwrap();

    // Batch order is sorted by name: tag before user. Fail user's create.
    db.queue_result(vec![]);
    db.queue_result(vec![]);
    db.fail_execute_containing("`user`");
    let err = engine.migrate_all().unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));

    let tags: Vec<String> = db.logged().into_iter().map(|(tag, _, _)| tag).collect();
    assert!(tags.contains(&"rollback".to_string()));
    assert!(!tags.contains(&"commit".to_string()));
}

#[test]
fn test_insert_binds_schema_column_order() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    let mut record = Record::new();
    record.insert("username".to_string(), Value::from("admin"));
    let affected = engine.insert("user", &[record]).unwrap();
    assert_eq!(affected, 1);

    let (_, sql, args) = db.logged().last().unwrap().clone();
    assert_eq!(sql, "INSERT INTO user (id, username, age) VALUES (?, ?, ?)");
    assert_eq!(args, vec![Value::Null, Value::from("admin"), Value::Null]);
}

#[test]
fn test_find_maps_rows_back_to_external_keys() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine
        .register(
            r#"{"code": "loginLog", "fields": [
                {"name": "id", "type": "id"},
                {"name": "ipAddress", "type": "string"}
            ]}"#,
        )
        .unwrap();

    let mut row = Record::new();
    row.insert("id".to_string(), Value::Int(1));
    row.insert("ip_address".to_string(), Value::from("10.0.0.1"));
    db.queue_result(vec![row]);

    let rows = engine.find("loginLog", &Condition::new(), &[]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("ipAddress"), Some(&Value::from("10.0.0.1")));
    assert!(rows[0].get("ip_address").is_none());

    let (_, sql, _) = db.logged().last().unwrap().clone();
    assert_eq!(sql, "SELECT id, ip_address FROM login_log");
}

#[test]
fn test_update_converts_set_keys() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    let mut set = Record::new();
    set.insert("username".to_string(), Value::from("root"));
    let cond = Condition::new().with("id", 7);
    engine.update("user", &set, &cond).unwrap();

    let (_, sql, args) = db.logged().last().unwrap().clone();
    assert_eq!(sql, "UPDATE user SET username = ? WHERE id = ?");
    assert_eq!(args, vec![Value::from("root"), Value::Int(7)]);
}

#[test]
fn test_delete_requires_condition() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    let err = engine.delete("user", &Condition::new()).unwrap_err();
    assert!(matches!(err, EngineError::EmptyDeleteCondition));

    let cond = Condition::new().with("id", 1);
    engine.delete("user", &cond).unwrap();
    let (_, sql, args) = db.logged().last().unwrap().clone();
    assert_eq!(sql, "DELETE FROM user WHERE id = ?");
    assert_eq!(args, vec![Value::Int(1)]);
}

#[test]
fn test_delete_refuses_conditions_without_predicates() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    // Every entry is dropped by the lenient compiler, leaving nothing to
    // filter on; executing this would strip the whole table.
    let cond = Condition::new().with("id between", vec![1]);
    let err = engine.delete("user", &cond).unwrap_err();
    assert!(matches!(err, EngineError::EmptyDeleteCondition));
    assert!(db.statements().iter().all(|s| !s.starts_with("DELETE")));
}

#[test]
fn test_delete_treats_select_keys_as_columns() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    // `limit` only shapes SELECT statements; in a delete it filters.
    engine.delete("user", &Condition::new().with("limit", 5)).unwrap();
    let (_, sql, args) = db.logged().last().unwrap().clone();
    assert_eq!(sql, "DELETE FROM user WHERE limit = ?");
    assert_eq!(args, vec![Value::Int(5)]);
}

#[test]
fn test_count_extracts_scalar() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    let mut row = Record::new();
    row.insert("COUNT(*)".to_string(), Value::Int(42));
    db.queue_result(vec![row]);

    let count = engine.count("user", &Condition::new().with("age gt", 18)).unwrap();
    assert_eq!(count, 42);

    let (_, sql, args) = db.logged().last().unwrap().clone();
    assert_eq!(sql, "SELECT COUNT(*) FROM user WHERE age > ?");
    assert_eq!(args, vec![Value::Int(18)]);
}

#[test]
fn test_count_accepts_decimal_scalar() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    let mut row = Record::new();
    row.insert("COUNT(*)".to_string(), Value::Float(42.0));
    db.queue_result(vec![row]);

    let count = engine.count("user", &Condition::new()).unwrap();
    assert_eq!(count, 42);
}

#[test]
fn test_first_injects_limit_one() {
    let db = Arc::new(FakeDb::default());
    let engine = new_engine(db.clone());
    engine.register(USER_MODEL).unwrap();

    db.queue_result(vec![]);
    let none = engine.first("user", &Condition::new().with("id", 9)).unwrap();
    assert!(none.is_none());

    let (_, sql, _) = db.logged().last().unwrap().clone();
    assert_eq!(
        sql,
        "SELECT id, username, age FROM user WHERE id = ? LIMIT 1"
    );
}

#[test]
fn test_register_runs_validator() {
    struct Rejector;
    impl tabula_schema::DocumentValidator for Rejector {
        fn validate(&self, _doc: &str) -> Result<(), Vec<String>> {
            Err(vec!["fields is required".to_string()])
        }
    }

    let db = Arc::new(FakeDb::default());
    db.queue_result(current_db_row());
    let engine = Engine::new(db, Arc::new(MysqlDialect::new()))
        .unwrap()
        .with_validator(Box::new(Rejector));

    let err = engine.register(USER_MODEL).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Schema(tabula_schema::SchemaError::ValidationFailed { .. })
    ));
}
