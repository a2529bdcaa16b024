//! Core error types.

use serde_json::Value;
use thiserror::Error;

/// Opaque error produced by a storage driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Core mapping errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A required, non-primary-key field is absent at validation time.
    #[error("'{field}' is required and cannot be undefined or null")]
    Required {
        /// Name of the missing field.
        field: String,
    },

    /// A value fails its field type's structural predicate.
    #[error("value '{value}' is not a valid '{expected}'")]
    Validation {
        /// The offending value.
        value: Value,
        /// Kind name or a more specific expectation (integer, enum membership).
        expected: String,
    },

    /// A value fails a caller-supplied business-rule predicate.
    #[error("value '{value}' failed custom validation")]
    CustomValidation {
        /// The offending value.
        value: Value,
    },

    /// A single-key lookup found zero matching records.
    #[error("document with id '{pk}' not found in model '{model}'")]
    DocumentNotFound {
        /// Primary key that was looked up.
        pk: Value,
        /// Name of the model.
        model: String,
    },

    /// A single-key lookup found more than one record.
    #[error("multiple documents returned with id '{pk}' in model '{model}'")]
    MultipleDocuments {
        /// Primary key that was looked up.
        pk: Value,
        /// Name of the model.
        model: String,
    },

    /// An operation was invoked on a driver that has not wired that capability.
    #[error("'{operation}' is not implemented")]
    NotImplemented {
        /// Name of the missing operation.
        operation: String,
    },

    /// Delete was called on an instance that has never been saved.
    #[error("cannot delete an unsaved record of model '{model}'")]
    NotPersisted {
        /// Name of the model.
        model: String,
    },

    /// A field name did not resolve to a declared, typed schema field.
    #[error("'{field}' is not a typed field of model '{model}'")]
    UnknownField {
        /// The unresolved field name.
        field: String,
        /// Name of the model.
        model: String,
    },

    /// Invalid model configuration. Raised synchronously at build time.
    #[error("model configuration error: {0}")]
    Config(String),

    /// A storage driver failed. Passed through unmodified.
    #[error("driver error: {0}")]
    Driver(#[source] DriverError),
}

impl Error {
    /// A missing required field.
    pub fn required(field: impl Into<String>) -> Self {
        Error::Required {
            field: field.into(),
        }
    }

    /// A structural validation failure.
    pub fn validation(value: Value, expected: impl Into<String>) -> Self {
        Error::Validation {
            value,
            expected: expected.into(),
        }
    }

    /// A business-rule validation failure.
    pub fn custom_validation(value: Value) -> Self {
        Error::CustomValidation { value }
    }

    /// A zero-result single-key lookup.
    pub fn document_not_found(pk: Value, model: impl Into<String>) -> Self {
        Error::DocumentNotFound {
            pk,
            model: model.into(),
        }
    }

    /// A multi-result single-key lookup.
    pub fn multiple_documents(pk: Value, model: impl Into<String>) -> Self {
        Error::MultipleDocuments {
            pk,
            model: model.into(),
        }
    }

    /// An unwired driver capability.
    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Error::NotImplemented {
            operation: operation.into(),
        }
    }

    /// An unresolved field name.
    pub fn unknown_field(field: impl Into<String>, model: impl Into<String>) -> Self {
        Error::UnknownField {
            field: field.into(),
            model: model.into(),
        }
    }

    /// Wrap a driver-originated failure.
    pub fn driver(source: impl Into<DriverError>) -> Self {
        Error::Driver(source.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_carry_context() {
        let err = Error::required("email");
        assert_eq!(
            err.to_string(),
            "'email' is required and cannot be undefined or null"
        );

        let err = Error::validation(json!(12.5), "integer");
        assert_eq!(err.to_string(), "value '12.5' is not a valid 'integer'");

        let err = Error::document_not_found(json!("a@b.com"), "Author");
        assert_eq!(
            err.to_string(),
            "document with id '\"a@b.com\"' not found in model 'Author'"
        );
    }

    #[test]
    fn test_driver_error_passthrough() {
        let inner = std::io::Error::other("disk on fire");
        let err = Error::driver(inner);
        assert!(err.to_string().contains("disk on fire"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
