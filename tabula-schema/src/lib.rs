//! # tabula-schema
//!
//! Model definition documents and the runtime schema model for Tabula.
//!
//! This crate provides:
//! - Serde types for the declarative model document ([`ModelDocument`])
//! - The immutable runtime model ([`Schema`], [`Field`], [`FieldType`])
//! - The external/storage name-casing utility ([`casing`])
//! - The external validator contract ([`DocumentValidator`])
//!
//! ## Example
//!
//! ```rust
//! use tabula_schema::Schema;
//!
//! let schema = Schema::parse(r#"{
//!     "code": "user",
//!     "fields": [
//!         {"name": "id", "type": "id"},
//!         {"name": "userName", "type": "string", "required": true}
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(schema.table_name, "user");
//! assert_eq!(schema.field("userName").unwrap().column, "user_name");
//! ```

pub mod casing;
pub mod document;
pub mod error;
pub mod field;
pub mod schema;
pub mod validator;

pub use document::{FieldDef, IndexHint, ModelDocument, ModelOptions};
pub use error::{SchemaError, SchemaResult};
pub use field::{Field, FieldType};
pub use schema::Schema;
pub use validator::{AcceptAll, DocumentValidator};
