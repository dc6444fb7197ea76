//! Runtime field model: abstract types and one column's definition.

use serde::{Deserialize, Serialize};

/// The fixed, dialect-independent set of field types.
///
/// An `enum` in the document resolves to its underlying scalar type here,
/// with the allowed literals kept on [`Field::enum_values`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Primary-key integer. A field of this type is always a primary key.
    Id,
    /// Bounded character data (`varchar`).
    String,
    /// Unbounded character data.
    Text,
    Int,
    Bool,
    Float32,
    Float64,
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    Json,
}

impl FieldType {
    /// Parse an abstract type name, case-insensitively.
    ///
    /// Returns `None` for names outside the fixed set; the caller surfaces
    /// that as a typed configuration error rather than panicking.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "string" => Some(Self::String),
            "text" => Some(Self::Text),
            "int" => Some(Self::Int),
            "bool" => Some(Self::Bool),
            "float32" => Some(Self::Float32),
            "float64" => Some(Self::Float64),
            "date" => Some(Self::Date),
            "datetime" => Some(Self::DateTime),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::String => "string",
            Self::Text => "text",
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Json => "json",
        }
    }

    /// Whether a literal DEFAULT of this type renders inside quotes.
    ///
    /// Numeric, boolean, temporal and json defaults render unquoted.
    pub fn default_needs_quotes(&self) -> bool {
        matches!(self, Self::String | Self::Text)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column's resolved definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Display name.
    pub label: String,
    /// External identifier (mixed case), used in API records.
    pub name: String,
    /// Storage identifier (snake case), used in SQL.
    pub column: String,
    /// Abstract type; an enum field carries its underlying scalar here.
    pub field_type: FieldType,
    /// Allowed literals, present only for enum fields. Declared order.
    pub enum_values: Vec<String>,
    pub comment: String,
    /// Default value literal, or raw SQL expression when `is_default_raw`.
    pub default: Option<String>,
    pub is_default_raw: bool,
    pub is_primary_key: bool,
    pub not_null: bool,
    /// Index name (`IDX_<table>_<column>` when derived), if indexed.
    pub index: Option<String>,
    /// Unique index name (`UNI_<table>_<column>` when derived), if unique.
    pub unique: Option<String>,
    pub length: u32,
    pub precision: u32,
    pub scale: u32,
}

impl Field {
    /// Whether this field declares an enum literal set.
    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}
