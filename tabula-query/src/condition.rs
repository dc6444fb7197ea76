//! The condition algebra: a recursive, deterministic compiler from
//! condition maps to SQL predicate fragments and positional bound
//! arguments.
//!
//! A condition map entry is keyed by either a bare column name (the
//! operator is chosen by the value's shape: scalar → `=`, list → `IN`) or
//! `"<column> <operator>"`, single-space separated. `or`/`and` entries
//! nest whole condition maps and compile to one parenthesized group.
//!
//! Entries are kept sorted lexicographically by key, so identical logical
//! filters always produce identical SQL text regardless of how the map was
//! built.
//!
//! Malformed entries (wrong arity, wrong value shape, unknown third key
//! token) are silently dropped by the default lenient compiler. This is a
//! deliberate compatibility behavior, not an oversight: a caller that
//! needs filtering to be enforced should use [`Compiler::strict`], which
//! surfaces the same situations as [`ConditionError`]s.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use thiserror::Error;

use tabula_schema::casing::to_storage;

use crate::sql::SqlFlavor;
use crate::value::Value;

/// Result type for strict condition compilation.
pub type ConditionResult<T> = Result<T, ConditionError>;

/// Errors surfaced by the strict compiler for entries the lenient
/// compiler would drop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    /// A key with more than two space-separated tokens.
    #[error("malformed condition key `{0}`")]
    MalformedKey(String),

    /// An operator given the wrong number of values.
    #[error("operator `{operator}` on `{column}` expects exactly {expected} value(s), got {got}")]
    WrongArity {
        column: String,
        operator: &'static str,
        expected: usize,
        got: usize,
    },

    /// `or`/`and` given a value that is not a nested condition map.
    #[error("operator `{operator}` expects a nested condition map")]
    ExpectedCondition { operator: &'static str },

    /// A comparison operator given a list or nested map.
    #[error("operator `{operator}` on `{column}` expects a scalar value")]
    ExpectedScalar {
        column: String,
        operator: &'static str,
    },

    /// An `in` (or list-valued equality) with no elements.
    #[error("empty IN list for `{column}`")]
    EmptyList { column: String },
}

/// Recognized condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Like,
    NotLike,
    Between,
    NotBetween,
    IsNull,
    IsNotNull,
    Is,
    Or,
    And,
}

impl Operator {
    /// Parse an operator token, case-insensitively. Unknown tokens fall
    /// back to `eq` at the call site, not here.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            "like" => Some(Self::Like),
            "not_like" => Some(Self::NotLike),
            "between" => Some(Self::Between),
            "not_between" => Some(Self::NotBetween),
            "is_null" => Some(Self::IsNull),
            "is_not_null" => Some(Self::IsNotNull),
            "is" => Some(Self::Is),
            "or" => Some(Self::Or),
            "and" => Some(Self::And),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Like => "like",
            Self::NotLike => "not_like",
            Self::Between => "between",
            Self::NotBetween => "not_between",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::Is => "is",
            Self::Or => "or",
            Self::And => "and",
        }
    }
}

/// A condition entry's value, shape-tagged once at construction so the
/// compiler never re-inspects runtime types.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Scalar(Value),
    List(Vec<Value>),
    Nested(Condition),
}

impl From<Value> for ConditionValue {
    fn from(v: Value) -> Self {
        Self::Scalar(v)
    }
}

macro_rules! scalar_condition_value {
    ($($t:ty),*) => {
        $(impl From<$t> for ConditionValue {
            fn from(v: $t) -> Self {
                Self::Scalar(v.into())
            }
        })*
    };
}
scalar_condition_value!(bool, i32, i64, u32, f64, String, &str);

impl<T: Into<Value>> From<Vec<T>> for ConditionValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Condition> for ConditionValue {
    fn from(v: Condition) -> Self {
        Self::Nested(v)
    }
}

impl From<JsonValue> for ConditionValue {
    fn from(v: JsonValue) -> Self {
        match v {
            JsonValue::Array(items) => {
                Self::List(items.into_iter().map(Value::from).collect())
            }
            JsonValue::Object(map) => Self::Nested(Condition::from(map)),
            scalar => Self::Scalar(Value::from(scalar)),
        }
    }
}

/// Keys `build_select` interprets as statement shape rather than
/// predicates. Only that builder treats them specially, and only at the
/// top level of its condition; everywhere else they are ordinary column
/// names.
pub const RESERVED_KEYS: [&str; 5] = ["limit", "offset", "order_by", "group_by", "having"];

fn is_reserved(storage_key: &str) -> bool {
    RESERVED_KEYS.contains(&storage_key)
}

/// An ordered condition map.
///
/// Keys are storage-cased on insertion, so `orderBy` and `order_by`
/// address the same entry. Entries are sorted lexicographically by key; a
/// duplicate key replaces the earlier entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    entries: Vec<(String, ConditionValue)>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. The key is storage-cased immediately.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConditionValue>) {
        let key = to_storage(&key.into());
        let value = value.into();
        match self.entries.binary_search_by(|(k, _)| k.as_str().cmp(&key)) {
            Ok(i) => self.entries[i].1 = value,
            Err(i) => self.entries.insert(i, (key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConditionValue> {
        self.entries
            .binary_search_by(|(k, _)| k.as_str().cmp(key))
            .ok()
            .map(|i| &self.entries[i].1)
    }

    /// Copy with the top-level [`RESERVED_KEYS`] entries removed. Nested
    /// occurrences stay; there they are ordinary column names.
    pub fn without_reserved(&self) -> Condition {
        Condition {
            entries: self
                .entries
                .iter()
                .filter(|(k, _)| !is_reserved(k))
                .cloned()
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in compile order (lexicographic by key).
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConditionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<serde_json::Map<String, JsonValue>> for Condition {
    fn from(map: serde_json::Map<String, JsonValue>) -> Self {
        let mut cond = Condition::new();
        for (k, v) in map {
            cond.insert(k, ConditionValue::from(v));
        }
        cond
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::deserialize(deserializer)?;
        Ok(Condition::from(map))
    }
}

impl<K: Into<String>, V: Into<ConditionValue>> FromIterator<(K, V)> for Condition {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut cond = Condition::new();
        for (k, v) in iter {
            cond.insert(k, v);
        }
        cond
    }
}

/// The output of compiling a condition: predicate expressions and their
/// bound arguments in left-to-right placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compiled {
    pub predicates: Vec<String>,
    pub params: Vec<Value>,
}

impl Compiled {
    /// Join predicates with AND into a WHERE body, if any.
    pub fn joined(&self) -> Option<String> {
        if self.predicates.is_empty() {
            None
        } else {
            Some(self.predicates.join(" AND "))
        }
    }
}

/// Compiles [`Condition`]s into SQL predicates.
#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    flavor: SqlFlavor,
    strict: bool,
}

impl Compiler {
    /// Lenient compiler: malformed entries are dropped.
    pub fn new(flavor: SqlFlavor) -> Self {
        Self {
            flavor,
            strict: false,
        }
    }

    /// Strict compiler: malformed entries are errors.
    pub fn strict(flavor: SqlFlavor) -> Self {
        Self {
            flavor,
            strict: true,
        }
    }

    pub fn compile(&self, condition: &Condition) -> ConditionResult<Compiled> {
        self.compile_offset(condition, 0)
    }

    /// Compile with placeholder numbering starting after `param_offset`
    /// already-bound parameters (relevant for numbered-placeholder
    /// flavors, e.g. when HAVING follows WHERE).
    pub fn compile_offset(
        &self,
        condition: &Condition,
        param_offset: usize,
    ) -> ConditionResult<Compiled> {
        let mut out = Compiled::default();
        self.compile_into(condition, param_offset, &mut out)?;
        Ok(out)
    }

    fn compile_into(
        &self,
        condition: &Condition,
        offset: usize,
        out: &mut Compiled,
    ) -> ConditionResult<()> {
        for (key, value) in condition.iter() {
            if let Some(predicate) = self.entry(key, value, offset, &mut out.params)? {
                out.predicates.push(predicate);
            }
        }
        Ok(())
    }

    fn entry(
        &self,
        key: &str,
        value: &ConditionValue,
        offset: usize,
        params: &mut Vec<Value>,
    ) -> ConditionResult<Option<String>> {
        let tokens: Vec<&str> = key.split(' ').collect();
        match tokens.as_slice() {
            [single] => match Operator::parse(single) {
                // A combinator can stand alone as the whole key.
                Some(op @ (Operator::Or | Operator::And)) => {
                    self.combinator(op, value, offset, params)
                }
                _ => self.bare(single, value, offset, params),
            },
            [column, op_token] => {
                // Unknown operator tokens fall back to eq.
                let op = Operator::parse(op_token).unwrap_or(Operator::Eq);
                self.operator(column, op, value, offset, params)
            }
            _ => self.drop_or(ConditionError::MalformedKey(key.to_string())),
        }
    }

    /// Bare column key: operator chosen by value shape.
    fn bare(
        &self,
        column: &str,
        value: &ConditionValue,
        offset: usize,
        params: &mut Vec<Value>,
    ) -> ConditionResult<Option<String>> {
        match value {
            ConditionValue::Scalar(v) => Ok(Some(self.comparison(column, "=", v, offset, params))),
            ConditionValue::List(items) => self.in_list(column, items, false, offset, params),
            ConditionValue::Nested(_) => self.drop_or(ConditionError::ExpectedScalar {
                column: column.to_string(),
                operator: "eq",
            }),
        }
    }

    fn operator(
        &self,
        column: &str,
        op: Operator,
        value: &ConditionValue,
        offset: usize,
        params: &mut Vec<Value>,
    ) -> ConditionResult<Option<String>> {
        match op {
            Operator::Eq => self.bare(column, value, offset, params),
            Operator::In => match value {
                ConditionValue::List(items) => self.in_list(column, items, false, offset, params),
                // Scalar `in` degrades to equality.
                ConditionValue::Scalar(v) => {
                    Ok(Some(self.comparison(column, "=", v, offset, params)))
                }
                ConditionValue::Nested(_) => self.drop_or(ConditionError::ExpectedScalar {
                    column: column.to_string(),
                    operator: op.name(),
                }),
            },
            Operator::Neq => self.scalar_comparison(column, op, "!=", value, offset, params),
            Operator::Gt => self.scalar_comparison(column, op, ">", value, offset, params),
            Operator::Gte => self.scalar_comparison(column, op, ">=", value, offset, params),
            Operator::Lt => self.scalar_comparison(column, op, "<", value, offset, params),
            Operator::Lte => self.scalar_comparison(column, op, "<=", value, offset, params),
            Operator::Like => self.scalar_comparison(column, op, "LIKE", value, offset, params),
            Operator::NotLike => {
                self.scalar_comparison(column, op, "NOT LIKE", value, offset, params)
            }
            Operator::Between => self.between(column, op, "BETWEEN", value, offset, params),
            Operator::NotBetween => {
                self.between(column, op, "NOT BETWEEN", value, offset, params)
            }
            Operator::IsNull => Ok(Some(format!("{column} IS NULL"))),
            Operator::IsNotNull => Ok(Some(format!("{column} IS NOT NULL"))),
            Operator::Is => match value {
                // IS only applies to booleans; anything else degrades to eq.
                ConditionValue::Scalar(Value::Bool(b)) => {
                    Ok(Some(format!("{column} IS {}", if *b { "TRUE" } else { "FALSE" })))
                }
                other => self.bare(column, other, offset, params),
            },
            Operator::Or | Operator::And => self.combinator(op, value, offset, params),
        }
    }

    fn combinator(
        &self,
        op: Operator,
        value: &ConditionValue,
        offset: usize,
        params: &mut Vec<Value>,
    ) -> ConditionResult<Option<String>> {
        let ConditionValue::Nested(child) = value else {
            return self.drop_or(ConditionError::ExpectedCondition { operator: op.name() });
        };
        let mut inner = Compiled {
            predicates: Vec::new(),
            params: std::mem::take(params),
        };
        let result = self.compile_into(child, offset, &mut inner);
        *params = inner.params;
        result?;
        if inner.predicates.is_empty() {
            return Ok(None);
        }
        let joiner = if op == Operator::Or { " OR " } else { " AND " };
        Ok(Some(format!("({})", inner.predicates.join(joiner))))
    }

    fn scalar_comparison(
        &self,
        column: &str,
        op: Operator,
        sql_op: &str,
        value: &ConditionValue,
        offset: usize,
        params: &mut Vec<Value>,
    ) -> ConditionResult<Option<String>> {
        match value {
            ConditionValue::Scalar(v) => {
                Ok(Some(self.comparison(column, sql_op, v, offset, params)))
            }
            _ => self.drop_or(ConditionError::ExpectedScalar {
                column: column.to_string(),
                operator: op.name(),
            }),
        }
    }

    fn comparison(
        &self,
        column: &str,
        sql_op: &str,
        value: &Value,
        offset: usize,
        params: &mut Vec<Value>,
    ) -> String {
        let placeholder = self.bind(value.clone(), offset, params);
        format!("{column} {sql_op} {placeholder}")
    }

    fn in_list(
        &self,
        column: &str,
        items: &[Value],
        _negated: bool,
        offset: usize,
        params: &mut Vec<Value>,
    ) -> ConditionResult<Option<String>> {
        if items.is_empty() {
            return self.drop_or(ConditionError::EmptyList {
                column: column.to_string(),
            });
        }
        let placeholders: Vec<String> = items
            .iter()
            .map(|v| self.bind(v.clone(), offset, params))
            .collect();
        Ok(Some(format!("{column} IN ({})", placeholders.join(", "))))
    }

    fn between(
        &self,
        column: &str,
        op: Operator,
        sql_op: &str,
        value: &ConditionValue,
        offset: usize,
        params: &mut Vec<Value>,
    ) -> ConditionResult<Option<String>> {
        let ConditionValue::List(items) = value else {
            return self.drop_or(ConditionError::WrongArity {
                column: column.to_string(),
                operator: op.name(),
                expected: 2,
                got: 0,
            });
        };
        if items.len() != 2 {
            return self.drop_or(ConditionError::WrongArity {
                column: column.to_string(),
                operator: op.name(),
                expected: 2,
                got: items.len(),
            });
        }
        let low = self.bind(items[0].clone(), offset, params);
        let high = self.bind(items[1].clone(), offset, params);
        Ok(Some(format!("{column} {sql_op} {low} AND {high}")))
    }

    fn bind(&self, value: Value, offset: usize, params: &mut Vec<Value>) -> String {
        let index = offset + params.len() + 1;
        params.push(value);
        self.flavor.placeholder(index)
    }

    fn drop_or(&self, err: ConditionError) -> ConditionResult<Option<String>> {
        if self.strict { Err(err) } else { Ok(None) }
    }
}
