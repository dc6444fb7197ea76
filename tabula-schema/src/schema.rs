//! The runtime schema model and its parser.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::casing::to_storage;
use crate::document::{FieldDef, IndexHint, ModelDocument};
use crate::error::{SchemaError, SchemaResult};
use crate::field::{Field, FieldType};

/// One record type: an immutable, ordered set of [`Field`]s plus lookup
/// structures derived at parse time.
///
/// A `Schema` is created once from a model definition (a pure function, no
/// I/O) and never mutates; it is replaced wholesale when the same name is
/// re-registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Logical name, as written in the document's `code`.
    pub name: String,
    /// Table name: the storage casing of `name`.
    pub table_name: String,
    pub comment: String,
    /// Fields in declaration order; authoritative for column ordering.
    pub fields: Vec<Field>,
    /// Storage column names, in lock-step with `fields`.
    pub field_names: Vec<String>,
    /// External field name → index into `fields`. Duplicate names in the
    /// document overwrite earlier entries (last writer wins).
    field_map: IndexMap<String, usize>,
}

impl Schema {
    /// Parse a model definition document from JSON text.
    pub fn parse(definition: &str) -> SchemaResult<Self> {
        let doc = ModelDocument::from_json(definition)?;
        Self::from_document(&doc)
    }

    /// Build a schema from an already-deserialized document.
    pub fn from_document(doc: &ModelDocument) -> SchemaResult<Self> {
        let table_name = to_storage(&doc.code);
        let mut schema = Schema {
            name: doc.code.clone(),
            table_name,
            comment: doc.comment.clone(),
            fields: Vec::with_capacity(doc.fields.len()),
            field_names: Vec::with_capacity(doc.fields.len()),
            field_map: IndexMap::new(),
        };
        for def in &doc.fields {
            let field = resolve_field(def, &schema.table_name)?;
            schema.field_names.push(field.column.clone());
            schema
                .field_map
                .insert(field.name.clone(), schema.fields.len());
            schema.fields.push(field);
        }
        debug!(
            schema = %schema.name,
            fields = schema.fields.len(),
            "parsed model definition"
        );
        Ok(schema)
    }

    /// Look up a field by its external name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_map.get(name).map(|&i| &self.fields[i])
    }

    /// Storage column names of all primary-key fields, in declared order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_primary_key)
            .map(|f| f.column.as_str())
            .collect()
    }
}

fn resolve_field(def: &FieldDef, table_name: &str) -> SchemaResult<Field> {
    let raw_type = def.type_name.to_ascii_lowercase();
    let (field_type, enum_values) = if raw_type == "enum" {
        let underlying = def
            .enum_type
            .as_deref()
            .ok_or_else(|| SchemaError::MissingEnumType {
                field: def.name.clone(),
            })?;
        let ft = FieldType::parse(underlying)
            .ok_or_else(|| SchemaError::invalid_field_type(&def.name, underlying))?;
        (ft, def.enum_values.clone())
    } else {
        let ft = FieldType::parse(&raw_type)
            .ok_or_else(|| SchemaError::invalid_field_type(&def.name, &def.type_name))?;
        (ft, Vec::new())
    };

    let column = to_storage(&def.name);
    let (default, is_default_raw) = resolve_default(def);

    Ok(Field {
        label: def.label.clone(),
        name: def.name.clone(),
        column: column.clone(),
        field_type,
        enum_values,
        comment: def.comment.clone(),
        default,
        is_default_raw,
        is_primary_key: raw_type == "id",
        not_null: def.required,
        index: resolve_index_name(def.index.as_ref(), "IDX", table_name, &column),
        unique: resolve_index_name(def.unique.as_ref(), "UNI", table_name, &column),
        length: def.length,
        precision: def.precision,
        scale: def.scale,
    })
}

/// `true` derives `<PREFIX>_<table>_<column>` in uppercase; a string is
/// taken verbatim so multiple fields can share a composite index name.
fn resolve_index_name(
    hint: Option<&IndexHint>,
    prefix: &str,
    table_name: &str,
    column: &str,
) -> Option<String> {
    match hint {
        Some(IndexHint::Flag(true)) => {
            Some(format!("{prefix}_{table_name}_{column}").to_uppercase())
        }
        Some(IndexHint::Flag(false)) | None => None,
        Some(IndexHint::Named(name)) => Some(name.clone()),
    }
}

fn resolve_default(def: &FieldDef) -> (Option<String>, bool) {
    if let Some(raw) = &def.default_raw {
        if !raw.is_empty() {
            return (Some(raw.clone()), true);
        }
    }
    let rendered = match &def.default {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Bool(b)) => Some(b.to_string()),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    };
    (rendered, false)
}
