//! Field descriptors: one field's storage, read, write, and validation contract.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;
use crate::model::Instance;
use crate::Document;

use super::kind::{coerce_timestamp, now_millis, TypeKind};

/// Caller-supplied sanitizer. Runs after the required check, so a
/// sanitizer can never satisfy a required field.
pub type SanitizeFn = dyn Fn(Value, &Instance) -> Value + Send + Sync;

/// Caller-supplied business-rule predicate, invoked with the (possibly
/// sanitized) value and the instance it belongs to.
pub type ValidateFn = dyn Fn(&Value, &Instance) -> bool + Send + Sync;

/// A field descriptor within a schema.
///
/// Created once when a schema is declared, immutable thereafter, and
/// shared by reference across every instance of the model.
#[derive(Clone)]
pub struct Descriptor {
    kind: TypeKind,
    required: bool,
    primary_key: bool,
    default: Option<Value>,
    sanitize: Option<Arc<SanitizeFn>>,
    validate: Option<Arc<ValidateFn>>,
}

impl Descriptor {
    /// Create a descriptor of the given kind.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            required: false,
            primary_key: false,
            default: None,
            sanitize: None,
            validate: None,
        }
    }

    /// A field accepting any value.
    pub fn any() -> Self {
        Self::new(TypeKind::Any)
    }

    /// A string field.
    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }

    /// A numeric field.
    pub fn number() -> Self {
        Self::new(TypeKind::Number { integer: false })
    }

    /// A boolean field.
    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    /// A date field, stored as epoch milliseconds.
    pub fn date() -> Self {
        Self::new(TypeKind::Date { auto: false })
    }

    /// A nested-record field.
    pub fn object() -> Self {
        Self::new(TypeKind::Object)
    }

    /// A sequence field.
    pub fn array() -> Self {
        Self::new(TypeKind::Array)
    }

    /// An enumeration field restricted to the given values.
    pub fn enumeration(values: impl IntoIterator<Item = Value>) -> Self {
        Self::new(TypeKind::Enum {
            values: values.into_iter().collect(),
        })
    }

    /// Require a value at validation time.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Flag this field as the model's primary key.
    ///
    /// Primary keys are never subject to the required check.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Restrict a `Number` field to integers. No effect on other kinds.
    pub fn integer(mut self) -> Self {
        if let TypeKind::Number { integer } = &mut self.kind {
            *integer = true;
        }
        self
    }

    /// Fill a `Date` field with the current time when no value is stored.
    /// No effect on other kinds.
    pub fn auto(mut self) -> Self {
        if let TypeKind::Date { auto } = &mut self.kind {
            *auto = true;
        }
        self
    }

    /// Set the default value, lazily applied on read.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set a sanitizer run before validation.
    pub fn sanitize(mut self, f: impl Fn(Value, &Instance) -> Value + Send + Sync + 'static) -> Self {
        self.sanitize = Some(Arc::new(f));
        self
    }

    /// Set a business-rule predicate run after the kind check.
    pub fn validate(mut self, f: impl Fn(&Value, &Instance) -> bool + Send + Sync + 'static) -> Self {
        self.validate = Some(Arc::new(f));
        self
    }

    /// The field's kind.
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Whether a value is required at validation time.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether this field is flagged as the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// The default value, if any.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub(crate) fn mark_primary_key(&mut self) {
        self.primary_key = true;
    }

    /// Read the field's current value: the stored value if present, else
    /// the default. An `auto` date substitutes the current time when
    /// nothing is stored.
    pub fn read(&self, values: &Document, field: &str) -> Option<Value> {
        let value = values
            .get(field)
            .cloned()
            .or_else(|| self.default.clone());

        if value.is_none() {
            if let TypeKind::Date { auto: true } = self.kind {
                return Some(Value::from(now_millis()));
            }
        }

        value
    }

    /// Store a value verbatim. Dates are coerced to epoch milliseconds
    /// first; an uncoercible date value is dropped, leaving any previously
    /// stored value untouched. Returns whether the write landed.
    pub(crate) fn write(&self, values: &mut Document, field: &str, value: Value) -> bool {
        let value = match self.kind {
            TypeKind::Date { .. } => match coerce_timestamp(&value) {
                Some(ts) => Value::from(ts),
                None => {
                    tracing::debug!(field, %value, "dropping uncoercible date value");
                    return false;
                }
            },
            _ => value,
        };

        values.insert(field.to_owned(), value);
        true
    }

    /// Validate the field on an instance: required check, sanitize, kind
    /// predicate, then the caller's business rule.
    pub(crate) fn validate_field(&self, instance: &Instance, field: &str) -> Result<(), Error> {
        let value = self.read(instance.values(), field);

        // The required check runs before sanitize, so a sanitizer can
        // never override the required flag.
        let value = match value.filter(|v| !v.is_null()) {
            Some(v) => v,
            None => {
                if self.required && !self.primary_key {
                    return Err(Error::required(field));
                }
                return Ok(());
            }
        };

        let value = match &self.sanitize {
            Some(f) => f(value, instance),
            None => value,
        };

        self.kind.check(&value)?;

        if let Some(f) = &self.validate {
            if !f(&value, instance) {
                return Err(Error::custom_validation(value));
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("primary_key", &self.primary_key)
            .field("default", &self.default)
            .field("sanitize", &self.sanitize.is_some())
            .field("validate", &self.validate.is_some())
            .finish()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.name())
    }
}
