//! Field kind definitions and their structural predicates.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::Error;

/// Field kinds supported by docmap schemas.
///
/// Kind-specific options live on the variant itself: a `Number` may be
/// constrained to integers, a `Date` may auto-fill with the current time,
/// an `Enum` carries its ordered set of allowed values.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Any value. Never fails the structural check.
    Any,
    /// UTF-8 string.
    String,
    /// Finite numeric value, optionally integer-only.
    Number {
        /// Reject values with a fractional part.
        integer: bool,
    },
    /// Boolean.
    Boolean,
    /// Calendar instant, stored as epoch milliseconds.
    Date {
        /// Substitute the current time when no value is stored.
        auto: bool,
    },
    /// Plain key-value record (not an array, not null).
    Object,
    /// Sequence of values.
    Array,
    /// Membership in a fixed set of values.
    Enum {
        /// Allowed values, in declaration order.
        values: Vec<Value>,
    },
}

impl TypeKind {
    /// The kind name, used in diagnostics and validation messages.
    pub fn name(&self) -> &'static str {
        match self {
            TypeKind::Any => "Any",
            TypeKind::String => "String",
            TypeKind::Number { .. } => "Number",
            TypeKind::Boolean => "Boolean",
            TypeKind::Date { .. } => "Date",
            TypeKind::Object => "Object",
            TypeKind::Array => "Array",
            TypeKind::Enum { .. } => "Enum",
        }
    }

    /// Evaluate the kind's structural predicate against a value.
    pub(crate) fn check(&self, value: &Value) -> Result<(), Error> {
        let ok = match self {
            TypeKind::Any => true,
            TypeKind::String => value.is_string(),
            TypeKind::Number { integer } => {
                if !value.is_number() {
                    false
                } else if *integer && !is_integral(value) {
                    return Err(Error::validation(value.clone(), "integer"));
                } else {
                    true
                }
            }
            TypeKind::Boolean => value.is_boolean(),
            TypeKind::Date { .. } => coerce_timestamp(value).is_some(),
            TypeKind::Object => value.is_object(),
            TypeKind::Array => value.is_array(),
            TypeKind::Enum { values } => {
                if values.contains(value) {
                    true
                } else {
                    let allowed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                    return Err(Error::validation(
                        value.clone(),
                        format!("one of: {}", allowed.join(", ")),
                    ));
                }
            }
        };

        if ok {
            Ok(())
        } else {
            Err(Error::validation(value.clone(), self.name()))
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a JSON number has no fractional part.
fn is_integral(value: &Value) -> bool {
    value.as_i64().is_some()
        || value.as_u64().is_some()
        || value.as_f64().is_some_and(|f| f.fract() == 0.0)
}

/// Coerce a value into epoch milliseconds.
///
/// Accepts numbers (already epoch milliseconds), RFC 3339 strings, and
/// plain `YYYY-MM-DD` dates (midnight UTC). Anything else is uncoercible.
pub(crate) fn coerce_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.timestamp_millis())
            .ok()
            .or_else(|| {
                s.parse::<NaiveDate>()
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc().timestamp_millis())
            }),
        _ => None,
    }
}

/// The current time as epoch milliseconds.
pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_predicates() {
        assert!(TypeKind::String.check(&json!("hi")).is_ok());
        assert!(TypeKind::String.check(&json!(12)).is_err());

        assert!(TypeKind::Boolean.check(&json!(true)).is_ok());
        assert!(TypeKind::Boolean.check(&json!("true")).is_err());

        assert!(TypeKind::Object.check(&json!({"a": 1})).is_ok());
        assert!(TypeKind::Object.check(&json!([1, 2])).is_err());
        assert!(TypeKind::Array.check(&json!([1, 2])).is_ok());
        assert!(TypeKind::Array.check(&json!({"a": 1})).is_err());

        assert!(TypeKind::Any.check(&json!(null)).is_ok());
    }

    #[test]
    fn test_number_predicate() {
        let number = TypeKind::Number { integer: false };
        assert!(number.check(&json!(1.5)).is_ok());
        assert!(number.check(&json!("1.5")).is_err());

        let integer = TypeKind::Number { integer: true };
        assert!(integer.check(&json!(42)).is_ok());
        assert!(integer.check(&json!(42.0)).is_ok());

        let err = integer.check(&json!(12.5)).unwrap_err();
        assert_eq!(err.to_string(), "value '12.5' is not a valid 'integer'");
    }

    #[test]
    fn test_enum_predicate() {
        let kind = TypeKind::Enum {
            values: vec![json!("draft"), json!("published")],
        };
        assert!(kind.check(&json!("draft")).is_ok());

        let err = kind.check(&json!("deleted")).unwrap_err();
        assert!(err.to_string().contains("one of: \"draft\", \"published\""));
    }

    #[test]
    fn test_date_coercion() {
        assert_eq!(coerce_timestamp(&json!(1452637592827i64)), Some(1452637592827));
        assert_eq!(
            coerce_timestamp(&json!("1970-01-01T00:00:01Z")),
            Some(1000)
        );
        assert_eq!(coerce_timestamp(&json!("1970-01-02")), Some(86_400_000));
        assert_eq!(coerce_timestamp(&json!("not a date")), None);
        assert_eq!(coerce_timestamp(&json!(true)), None);

        assert!(TypeKind::Date { auto: false }.check(&json!("not a date")).is_err());
        assert!(TypeKind::Date { auto: false }.check(&json!(0)).is_ok());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TypeKind::String.to_string(), "String");
        assert_eq!(TypeKind::Number { integer: true }.to_string(), "Number");
        assert_eq!(TypeKind::Enum { values: vec![] }.to_string(), "Enum");
    }
}
