//! The storage driver contract models persist through.
//!
//! The core only consumes this interface; what a driver stores records in
//! (and how it serializes them) is entirely its own business. Every
//! operation is asynchronous and may fail; failures pass through to the
//! caller unmodified as [`Error::Driver`].

mod memory;

pub use memory::MemoryDriver;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Error;
use crate::Document;

/// Result of a single-key lookup.
///
/// A `Many` result signals that the driver resolved one key to several
/// records, which the runtime reports as a multiple-documents condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// No record stored under the key.
    None,
    /// Exactly one record.
    One(Document),
    /// The key resolved to a collection of records.
    Many(Vec<Document>),
}

impl Lookup {
    /// Fold a list of raw records into a lookup result.
    pub fn from_records(mut records: Vec<Document>) -> Self {
        match records.len() {
            0 => Lookup::None,
            1 => Lookup::One(records.remove(0)),
            _ => Lookup::Many(records),
        }
    }
}

/// A record predicate: partial-value equality or an arbitrary boolean
/// function over a record.
#[derive(Clone)]
pub enum Predicate {
    /// Match records whose fields equal every field of the given partial
    /// record.
    Matches(Document),
    /// Match records the function returns `true` for.
    Func(Arc<dyn Fn(&Document) -> bool + Send + Sync>),
}

impl Predicate {
    /// Partial-value equality against the given fields.
    pub fn matches(fields: Document) -> Self {
        Predicate::Matches(fields)
    }

    /// Single-field equality.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = Document::new();
        fields.insert(field.into(), value.into());
        Predicate::Matches(fields)
    }

    /// An arbitrary boolean function over a record.
    pub fn func(f: impl Fn(&Document) -> bool + Send + Sync + 'static) -> Self {
        Predicate::Func(Arc::new(f))
    }

    /// Evaluate the predicate against a record.
    pub fn eval(&self, record: &Document) -> bool {
        match self {
            Predicate::Matches(fields) => fields
                .iter()
                .all(|(name, value)| record.get(name) == Some(value)),
            Predicate::Func(f) => f(record),
        }
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Matches(fields) => f.debug_tuple("Matches").field(fields).finish(),
            Predicate::Func(_) => f.debug_tuple("Func").finish(),
        }
    }
}

/// Async key-value contract the model runtime depends on.
///
/// `filter`, `remove`, and `remove_all` have default bodies that fail with
/// [`Error::NotImplemented`]; a driver that has not wired a capability
/// reports it through the error taxonomy rather than panicking.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Fetch the record stored under a primary key.
    async fn get(&self, pk: &Value) -> Result<Lookup, Error>;

    /// Fetch every stored record.
    async fn get_all(&self) -> Result<Vec<Document>, Error>;

    /// Store a record under a primary key. When no key is supplied the
    /// driver generates one; either way the effective key is returned.
    async fn set(&self, pk: Option<&Value>, record: &Document) -> Result<Value, Error>;

    /// Fetch every record matching a predicate.
    async fn filter(&self, predicate: &Predicate) -> Result<Vec<Document>, Error> {
        let _ = predicate;
        Err(Error::not_implemented("filter"))
    }

    /// Remove every record matching a predicate.
    async fn remove(&self, predicate: &Predicate) -> Result<(), Error> {
        let _ = predicate;
        Err(Error::not_implemented("remove"))
    }

    /// Remove every stored record.
    async fn remove_all(&self) -> Result<(), Error> {
        Err(Error::not_implemented("remove_all"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> Document {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn test_lookup_from_records() {
        assert_eq!(Lookup::from_records(vec![]), Lookup::None);

        let one = record(&[("a", json!(1))]);
        assert_eq!(
            Lookup::from_records(vec![one.clone()]),
            Lookup::One(one.clone())
        );

        assert!(matches!(
            Lookup::from_records(vec![one.clone(), one]),
            Lookup::Many(_)
        ));
    }

    #[test]
    fn test_matches_predicate_is_partial() {
        let rec = record(&[("admin", json!(true)), ("name", json!("A"))]);

        assert!(Predicate::eq("admin", true).eval(&rec));
        assert!(!Predicate::eq("admin", false).eval(&rec));
        assert!(!Predicate::eq("missing", true).eval(&rec));

        let both = Predicate::matches(record(&[("admin", json!(true)), ("name", json!("A"))]));
        assert!(both.eval(&rec));
    }

    #[test]
    fn test_func_predicate() {
        let rec = record(&[("age", json!(30))]);
        let adult = Predicate::func(|r| r.get("age").and_then(Value::as_i64).unwrap_or(0) >= 18);

        assert!(adult.eval(&rec));
        assert!(!adult.eval(&record(&[("age", json!(10))])));
    }
}
