//! Error types for model document parsing.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while turning a model document into a [`crate::Schema`].
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// The document is not valid JSON or does not match the expected shape.
    #[error("malformed model document: {0}")]
    #[diagnostic(code(tabula::schema::malformed_document))]
    MalformedDocument(#[from] serde_json::Error),

    /// A field declares an abstract type outside the fixed set.
    #[error("invalid field type `{type_name}` on field `{field}`")]
    #[diagnostic(
        code(tabula::schema::invalid_field_type),
        help("valid types: id, string, text, int, bool, float32, float64, date, datetime, json, enum")
    )]
    InvalidFieldType { field: String, type_name: String },

    /// An enum field is missing its underlying scalar type.
    #[error("enum field `{field}` is missing `enumType`")]
    #[diagnostic(code(tabula::schema::missing_enum_type))]
    MissingEnumType { field: String },

    /// The document failed meta-schema validation.
    #[error("model document validation failed with {} error(s)", errors.len())]
    #[diagnostic(code(tabula::schema::validation_failed))]
    ValidationFailed { errors: Vec<String> },
}

impl SchemaError {
    /// Create an invalid field type error.
    pub fn invalid_field_type(field: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::InvalidFieldType {
            field: field.into(),
            type_name: type_name.into(),
        }
    }
}
