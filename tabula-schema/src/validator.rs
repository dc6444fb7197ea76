//! Contract for external model-document validation.
//!
//! Validating a document against its meta-schema is a collaborator concern
//! (typically a JSON Schema implementation); the core consumes it only
//! through this trait. The engine runs the validator, when configured,
//! before parsing a document on registration.

/// Validates a raw model definition document.
pub trait DocumentValidator: Send + Sync {
    /// Returns `Ok(())` for a valid document, or the aggregated list of
    /// human-readable validation messages.
    fn validate(&self, document: &str) -> Result<(), Vec<String>>;
}

/// Validator that accepts every document. Useful in tests and for callers
/// that validate upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl DocumentValidator for AcceptAll {
    fn validate(&self, _document: &str) -> Result<(), Vec<String>> {
        Ok(())
    }
}
