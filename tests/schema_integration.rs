//! Integration tests for model parsing through the façade crate.
//!
//! These tests verify that the schema parser correctly handles various
//! model definitions and edge cases when consumed via `tabula_orm`.

use tabula_orm::schema::casing::{to_external, to_storage};
use tabula_orm::schema::{FieldType, SchemaError};
use tabula_orm::Schema;

/// Test basic model parsing with all field types
#[test]
fn test_parse_model_with_all_field_types() {
    let schema = Schema::parse(
        r#"{
            "code": "allTypes",
            "fields": [
                {"name": "id", "type": "id"},
                {"name": "shortText", "type": "string"},
                {"name": "longText", "type": "text"},
                {"name": "count", "type": "int"},
                {"name": "enabled", "type": "bool"},
                {"name": "ratio", "type": "float32"},
                {"name": "precise", "type": "float64"},
                {"name": "bornOn", "type": "date"},
                {"name": "updatedAt", "type": "datetime"},
                {"name": "payload", "type": "json"}
            ]
        }"#,
    )
    .expect("failed to parse model");

    assert_eq!(schema.name, "allTypes");
    assert_eq!(schema.table_name, "all_types");
    assert_eq!(schema.fields.len(), 10);
    assert_eq!(schema.field("shortText").unwrap().field_type, FieldType::String);
    assert_eq!(schema.field("precise").unwrap().field_type, FieldType::Float64);
}

/// Test that field attributes carry through to the runtime model
#[test]
fn test_parse_model_with_attributes() {
    let schema = Schema::parse(
        r#"{
            "code": "account",
            "comment": "login accounts",
            "fields": [
                {"name": "id", "type": "id"},
                {"name": "email", "type": "string", "length": 128,
                 "required": true, "unique": true, "index": true},
                {"name": "displayName", "type": "string",
                 "default": "anonymous"},
                {"name": "role", "type": "enum", "enumType": "string",
                 "enum": ["admin", "member"]}
            ]
        }"#,
    )
    .expect("failed to parse model");

    let email = schema.field("email").unwrap();
    assert!(email.not_null);
    assert_eq!(email.length, 128);
    assert_eq!(email.unique.as_deref(), Some("UNI_ACCOUNT_EMAIL"));
    assert_eq!(email.index.as_deref(), Some("IDX_ACCOUNT_EMAIL"));

    let display = schema.field("displayName").unwrap();
    assert_eq!(display.column, "display_name");
    assert_eq!(display.default.as_deref(), Some("anonymous"));

    let role = schema.field("role").unwrap();
    assert_eq!(role.field_type, FieldType::String);
    assert_eq!(role.enum_values, vec!["admin", "member"]);
}

/// Test that an unknown field type is a typed error, not a panic
#[test]
fn test_unknown_field_type_is_an_error() {
    let err = Schema::parse(
        r#"{"code": "bad", "fields": [{"name": "x", "type": "uuid"}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, SchemaError::InvalidFieldType { .. }));
}

/// Test external/storage name translation round-trips
#[test]
fn test_casing_round_trip() {
    for name in ["userName", "ipAddress", "a", "hello123World"] {
        assert_eq!(to_external(&to_storage(name)), name);
    }
    assert_eq!(to_storage("loginLog"), "login_log");
    assert_eq!(to_external("created_at"), "createdAt");
}
