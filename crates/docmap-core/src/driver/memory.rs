//! In-memory reference driver.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Error;
use crate::Document;

use super::{Driver, Lookup, Predicate};

/// A driver keeping every record in process memory.
///
/// Records are keyed by the canonical text of their primary key; absent
/// keys are generated as v4 UUIDs. Useful as the reference implementation
/// of the [`Driver`] contract and as a backing store for tests and demos.
#[derive(Debug, Default)]
pub struct MemoryDriver {
    records: RwLock<BTreeMap<String, Document>>,
}

impl MemoryDriver {
    /// Create an empty driver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw record under a key, bypassing the model runtime.
    pub fn seed(&self, key: impl Into<String>, record: Document) {
        self.records.write().insert(key.into(), record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn key_of(pk: &Value) -> String {
        match pk {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    async fn get(&self, pk: &Value) -> Result<Lookup, Error> {
        let records = self.records.read();
        Ok(records
            .get(&Self::key_of(pk))
            .cloned()
            .map_or(Lookup::None, Lookup::One))
    }

    async fn get_all(&self) -> Result<Vec<Document>, Error> {
        Ok(self.records.read().values().cloned().collect())
    }

    async fn set(&self, pk: Option<&Value>, record: &Document) -> Result<Value, Error> {
        let effective = match pk.filter(|v| !v.is_null()) {
            Some(value) => value.clone(),
            None => Value::String(Uuid::new_v4().to_string()),
        };

        tracing::trace!(key = %effective, "storing record");
        self.records
            .write()
            .insert(Self::key_of(&effective), record.clone());

        Ok(effective)
    }

    async fn filter(&self, predicate: &Predicate) -> Result<Vec<Document>, Error> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|record| predicate.eval(record))
            .cloned()
            .collect())
    }

    async fn remove(&self, predicate: &Predicate) -> Result<(), Error> {
        self.records
            .write()
            .retain(|_, record| !predicate.eval(record));
        Ok(())
    }

    async fn remove_all(&self) -> Result<(), Error> {
        self.records.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(name: &str) -> Document {
        let mut doc = Document::new();
        doc.insert("name".into(), json!(name));
        doc
    }

    #[tokio::test]
    async fn test_set_with_explicit_key() {
        let driver = MemoryDriver::new();

        let pk = driver.set(Some(&json!("a")), &record("A")).await.unwrap();
        assert_eq!(pk, json!("a"));

        let found = driver.get(&json!("a")).await.unwrap();
        assert_eq!(found, Lookup::One(record("A")));
    }

    #[tokio::test]
    async fn test_set_generates_missing_key() {
        let driver = MemoryDriver::new();

        let pk = driver.set(None, &record("A")).await.unwrap();
        assert!(pk.as_str().is_some_and(|s| !s.is_empty()));
        assert_eq!(driver.len(), 1);

        // A null key counts as absent too.
        let other = driver.set(Some(&Value::Null), &record("B")).await.unwrap();
        assert_ne!(pk, other);
        assert_eq!(driver.len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let driver = MemoryDriver::new();
        assert_eq!(driver.get(&json!("dne")).await.unwrap(), Lookup::None);
    }

    #[tokio::test]
    async fn test_non_string_keys_are_canonicalized() {
        let driver = MemoryDriver::new();

        driver.set(Some(&json!(42)), &record("A")).await.unwrap();
        assert_eq!(driver.get(&json!(42)).await.unwrap(), Lookup::One(record("A")));
    }

    #[tokio::test]
    async fn test_filter_and_remove() {
        let driver = MemoryDriver::new();
        driver.seed("a", record("A"));
        driver.seed("b", record("B"));
        driver.seed("c", record("A"));

        let matched = driver
            .filter(&Predicate::eq("name", "A"))
            .await
            .unwrap();
        assert_eq!(matched.len(), 2);

        driver.remove(&Predicate::eq("name", "A")).await.unwrap();
        assert_eq!(driver.len(), 1);

        driver.remove_all().await.unwrap();
        assert!(driver.is_empty());
    }
}
