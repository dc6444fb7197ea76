//! Serde representation of the model definition document.
//!
//! This is the wire shape of a model definition as authored (usually JSON).
//! [`crate::Schema::parse`] turns it into the immutable runtime model.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A declarative model definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDocument {
    /// Logical schema name (code identifier, mixed case).
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub comment: String,
    /// Field declarations, order authoritative for column ordering.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Reserved behavioral switches; accepted but not interpreted here.
    #[serde(default)]
    pub options: ModelOptions,
    /// Seed records, handled by an external loader; carried verbatim.
    #[serde(default)]
    pub values: Vec<serde_json::Map<String, JsonValue>>,
}

impl ModelDocument {
    /// Deserialize a document from its JSON text.
    pub fn from_json(doc: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(doc)
    }
}

/// One field declaration inside a model definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDef {
    /// Display name.
    #[serde(default)]
    pub label: String,
    /// External field identifier (mixed case).
    pub name: String,
    /// Abstract type name (`id`, `string`, `int`, `enum`, …).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Underlying scalar type for `enum` fields.
    #[serde(rename = "enumType", default)]
    pub enum_type: Option<String>,
    /// Allowed literals for `enum` fields, in declared order.
    #[serde(rename = "enum", default)]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub comment: String,
    /// Literal default value.
    #[serde(default)]
    pub default: Option<JsonValue>,
    /// Raw SQL default expression; takes precedence over `default`.
    #[serde(default)]
    pub default_raw: Option<String>,
    /// NOT NULL when set.
    #[serde(default)]
    pub required: bool,
    /// Secondary index request: `true` derives a name, a string names one.
    #[serde(default)]
    pub index: Option<IndexHint>,
    /// Unique index request, same convention as `index`.
    #[serde(default)]
    pub unique: Option<IndexHint>,
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub precision: u32,
    #[serde(default)]
    pub scale: u32,
}

/// An index request: boolean flag (derive the name) or explicit name.
///
/// An explicit name lets several fields share one composite index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexHint {
    Flag(bool),
    Named(String),
}

/// Reserved model-level switches. Parsed so documents round-trip; the core
/// engine does not act on them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelOptions {
    #[serde(default)]
    pub timestamps: bool,
    #[serde(rename = "softDelete", default)]
    pub soft_delete: bool,
}
