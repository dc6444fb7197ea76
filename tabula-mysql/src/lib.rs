//! # tabula-mysql
//!
//! MySQL reference dialect for Tabula: backtick-quoted identifiers,
//! positional `?` placeholders, INFORMATION_SCHEMA existence probe and
//! `SELECT DATABASE()` for the active database.
//!
//! DDL quotes identifiers; DML statements use plain storage-cased
//! identifiers, which are snake case and never clash with quoting rules.

use tabula_schema::casing::to_storage;
use tabula_schema::{Field, FieldType, Schema};

use tabula_query::condition::{Compiled, Compiler, Condition, ConditionValue};
use tabula_query::dialect::{BuildError, BuildResult, Dialect, Statement};
use tabula_query::sql::{SqlFlavor, placeholder_list};
use tabula_query::value::{Record, Value};

/// The MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MysqlDialect {
    compiler: Compiler,
}

impl MysqlDialect {
    /// Dialect with the lenient condition compiler (default behavior:
    /// malformed condition entries are dropped).
    pub fn new() -> Self {
        Self {
            compiler: Compiler::new(SqlFlavor::MySql),
        }
    }

    /// Dialect whose condition compiler rejects malformed entries.
    pub fn strict() -> Self {
        Self {
            compiler: Compiler::strict(SqlFlavor::MySql),
        }
    }

    fn column_sql(&self, field: &Field) -> String {
        let mut sql = SqlFlavor::MySql.quote(&field.column);
        sql.push(' ');
        match field.field_type {
            FieldType::String => {
                let length = if field.length > 0 { field.length } else { 255 };
                sql.push_str(&format!("varchar({length})"));
            }
            FieldType::Text if field.length > 0 => {
                sql.push_str(&format!("text({})", field.length));
            }
            other => sql.push_str(self.data_type_of(other)),
        }
        if field.is_primary_key || field.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &field.default {
            if field.is_default_raw || !field.field_type.default_needs_quotes() {
                sql.push_str(&format!(" DEFAULT {default}"));
            } else {
                sql.push_str(&format!(" DEFAULT '{}'", default.replace('\'', "''")));
            }
        }
        sql
    }

    fn where_clause(&self, condition: &Condition, param_offset: usize) -> BuildResult<Compiled> {
        Ok(self.compiler.compile_offset(condition, param_offset)?)
    }

    fn select_tail(
        &self,
        sql: &mut String,
        params: &mut Vec<Value>,
        condition: &Condition,
    ) -> BuildResult<()> {
        if let Some(group_by) = condition.get("group_by") {
            let columns = column_list(group_by);
            if !columns.is_empty() {
                sql.push_str(" GROUP BY ");
                sql.push_str(&columns.join(", "));
            }
        }
        if let Some(ConditionValue::Nested(having)) = condition.get("having") {
            let compiled = self.where_clause(having, params.len())?;
            if let Some(body) = compiled.joined() {
                sql.push_str(" HAVING ");
                sql.push_str(&body);
                params.extend(compiled.params);
            }
        }
        if let Some(order_by) = condition.get("order_by") {
            let specs = order_specs(order_by);
            if !specs.is_empty() {
                sql.push_str(" ORDER BY ");
                sql.push_str(&specs.join(", "));
            }
        }
        if let Some(limit) = non_negative_int(condition.get("limit")) {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = non_negative_int(condition.get("offset")) {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        Ok(())
    }
}

impl Default for MysqlDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn flavor(&self) -> SqlFlavor {
        SqlFlavor::MySql
    }

    fn data_type_of(&self, field_type: FieldType) -> &'static str {
        match field_type {
            FieldType::Id => "bigint",
            FieldType::String => "varchar",
            FieldType::Text => "text",
            FieldType::Int => "int",
            FieldType::Bool => "bool",
            FieldType::Float32 => "float",
            FieldType::Float64 => "double",
            FieldType::Date | FieldType::DateTime => "datetime",
            FieldType::Json => "json",
        }
    }

    fn current_database_sql(&self) -> String {
        "SELECT DATABASE()".to_string()
    }

    fn table_exists_sql(&self, table_name: &str, database: &str) -> Statement {
        (
            "SELECT TABLE_NAME FROM information_schema.tables \
             WHERE TABLE_NAME = ? AND TABLE_SCHEMA = ?"
                .to_string(),
            vec![Value::from(table_name), Value::from(database)],
        )
    }

    fn create_table_sql(&self, schema: &Schema) -> String {
        let columns: Vec<String> = schema.fields.iter().map(|f| self.column_sql(f)).collect();
        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({}",
            SqlFlavor::MySql.quote(&schema.table_name),
            columns.join(", "),
        );
        let primary_keys = schema.primary_key_columns();
        if !primary_keys.is_empty() {
            let quoted: Vec<String> = primary_keys
                .iter()
                .map(|c| SqlFlavor::MySql.quote(c))
                .collect();
            sql.push_str(&format!(", PRIMARY KEY({})", quoted.join(", ")));
        }
        sql.push(')');
        sql
    }

    fn drop_table_sql(&self, schema: &Schema) -> String {
        format!(
            "DROP TABLE IF EXISTS {}",
            SqlFlavor::MySql.quote(&schema.table_name)
        )
    }

    fn build_insert(&self, schema: &Schema, rows: &[Record]) -> BuildResult<Statement> {
        if rows.is_empty() {
            return Err(BuildError::EmptyInsert);
        }
        let columns = &schema.field_names;
        let mut params = Vec::with_capacity(columns.len() * rows.len());
        let mut groups = Vec::with_capacity(rows.len());
        for row in rows {
            let group = placeholder_list(SqlFlavor::MySql, params.len(), columns.len());
            for column in columns {
                params.push(row.get(column).cloned().unwrap_or(Value::Null));
            }
            groups.push(format!("({group})"));
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            schema.table_name,
            columns.join(", "),
            groups.join(", "),
        );
        Ok((sql, params))
    }

    fn build_select(
        &self,
        table_name: &str,
        columns: &[String],
        condition: &Condition,
    ) -> BuildResult<Statement> {
        let column_sql = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        let mut sql = format!("SELECT {column_sql} FROM {table_name}");
        // Reserved keys shape this statement below instead of filtering.
        let compiled = self.where_clause(&condition.without_reserved(), 0)?;
        let body = compiled.joined();
        let mut params = compiled.params;
        if let Some(body) = body {
            sql.push_str(" WHERE ");
            sql.push_str(&body);
        }
        self.select_tail(&mut sql, &mut params, condition)?;
        Ok((sql, params))
    }

    fn build_update(
        &self,
        table_name: &str,
        set: &Record,
        condition: &Condition,
    ) -> BuildResult<Statement> {
        // Deterministic SET order regardless of map insertion order.
        let mut pairs: Vec<(&String, &Value)> = set.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));

        let mut params: Vec<Value> = Vec::with_capacity(pairs.len());
        let assignments: Vec<String> = pairs
            .into_iter()
            .map(|(column, value)| {
                let placeholder = SqlFlavor::MySql.placeholder(params.len() + 1);
                params.push(value.clone());
                format!("{column} = {placeholder}")
            })
            .collect();

        let mut sql = format!("UPDATE {table_name} SET {}", assignments.join(", "));
        let compiled = self.where_clause(condition, params.len())?;
        if let Some(body) = compiled.joined() {
            sql.push_str(" WHERE ");
            sql.push_str(&body);
            params.extend(compiled.params);
        }
        Ok((sql, params))
    }

    fn build_delete(&self, table_name: &str, condition: &Condition) -> BuildResult<Statement> {
        let mut sql = format!("DELETE FROM {table_name}");
        let compiled = self.where_clause(condition, 0)?;
        let mut params = Vec::new();
        if let Some(body) = compiled.joined() {
            sql.push_str(" WHERE ");
            sql.push_str(&body);
            params = compiled.params;
        }
        Ok((sql, params))
    }

    fn build_count(&self, table_name: &str, condition: &Condition) -> BuildResult<Statement> {
        let mut sql = format!("SELECT COUNT(*) FROM {table_name}");
        let compiled = self.where_clause(condition, 0)?;
        let mut params = Vec::new();
        if let Some(body) = compiled.joined() {
            sql.push_str(" WHERE ");
            sql.push_str(&body);
            params = compiled.params;
        }
        Ok((sql, params))
    }
}

/// Columns for GROUP BY: a single name or a list of names, storage-cased.
fn column_list(value: &ConditionValue) -> Vec<String> {
    match value {
        ConditionValue::Scalar(Value::String(s)) => vec![to_storage(s)],
        ConditionValue::List(items) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(to_storage)
            .collect(),
        _ => Vec::new(),
    }
}

/// ORDER BY specs: `"column"` or `"column desc"`, single or list.
fn order_specs(value: &ConditionValue) -> Vec<String> {
    let raw: Vec<&str> = match value {
        ConditionValue::Scalar(Value::String(s)) => vec![s.as_str()],
        ConditionValue::List(items) => items.iter().filter_map(|v| v.as_str()).collect(),
        _ => Vec::new(),
    };
    raw.iter().filter_map(|spec| parse_order_spec(spec)).collect()
}

fn parse_order_spec(spec: &str) -> Option<String> {
    let mut parts = spec.split_whitespace();
    let column = to_storage(parts.next()?);
    let direction = match parts.next() {
        Some(d) if d.eq_ignore_ascii_case("desc") => "DESC",
        _ => "ASC",
    };
    Some(format!("{column} {direction}"))
}

/// LIMIT/OFFSET values must be non-negative integers; anything else is
/// ignored rather than erroring.
fn non_negative_int(value: Option<&ConditionValue>) -> Option<i64> {
    match value {
        Some(ConditionValue::Scalar(Value::Int(i))) if *i >= 0 => Some(*i),
        _ => None,
    }
}
