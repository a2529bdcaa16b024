//! The model handle: class-level operations over a shared configuration.

use std::sync::Arc;

use serde_json::Value;

use crate::driver::{Lookup, Predicate};
use crate::error::Error;
use crate::Document;

use super::config::{ModelBuilder, ModelConfig};
use super::instance::Instance;

/// A model: a compiled schema bound to a storage driver.
///
/// Cheap to clone; every clone and every [`Instance`] shares the same
/// immutable [`ModelConfig`].
#[derive(Debug, Clone)]
pub struct Model {
    config: Arc<ModelConfig>,
}

impl Model {
    /// Start declaring a model with the given name.
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(name)
    }

    pub(crate) fn from_config(config: ModelConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// The model's name.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Name of the primary-key field.
    pub fn primary_key(&self) -> &str {
        self.config.schema().primary_key()
    }

    /// The shared configuration.
    pub fn config(&self) -> &Arc<ModelConfig> {
        &self.config
    }

    /// Construct a new, unsaved instance from initial field data.
    ///
    /// Fields are routed through the compiled accessors, so write side
    /// effects (date coercion, primary-key semantics) apply.
    pub fn create(&self, initial: Document) -> Result<Instance, Error> {
        Instance::new(self.config.clone(), initial)
    }

    /// Fetch the instance stored under a primary key.
    pub async fn get(&self, pk: impl Into<Value>) -> Result<Instance, Error> {
        let pk = pk.into();
        match self.config.driver().get(&pk).await? {
            Lookup::One(record) => Ok(self.materialize(record)),
            Lookup::None => Err(Error::document_not_found(pk, self.name())),
            Lookup::Many(_) => Err(Error::multiple_documents(pk, self.name())),
        }
    }

    /// Fetch every stored record as a persisted instance.
    pub async fn all(&self) -> Result<Vec<Instance>, Error> {
        let records = self.config.driver().get_all().await?;
        Ok(records.into_iter().map(|r| self.materialize(r)).collect())
    }

    /// Fetch every record matching a predicate, as persisted instances.
    pub async fn filter(&self, predicate: Predicate) -> Result<Vec<Instance>, Error> {
        let records = self.config.driver().filter(&predicate).await?;
        Ok(records.into_iter().map(|r| self.materialize(r)).collect())
    }

    /// Remove every record matching a predicate. No materialization.
    pub async fn remove(&self, predicate: Predicate) -> Result<(), Error> {
        self.config.driver().remove(&predicate).await
    }

    /// Remove every stored record. No materialization.
    pub async fn remove_all(&self) -> Result<(), Error> {
        self.config.driver().remove_all().await
    }

    /// Wrap a raw driver record into a persisted-state instance.
    fn materialize(&self, record: Document) -> Instance {
        Instance::materialized(self.config.clone(), record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MemoryDriver;
    use crate::schema::{Descriptor, Schema};
    use serde_json::json;

    fn seeded_model() -> (Model, Arc<MemoryDriver>) {
        let driver = Arc::new(MemoryDriver::new());

        for (key, name, admin) in [
            ("test", "Test Inst", true),
            ("test2", "Test Inst 2", false),
            ("test3", "Test Inst 3", false),
        ] {
            let mut record = Document::new();
            record.insert("name".into(), json!(name));
            record.insert("email".into(), json!(format!("{key}@foo.com")));
            record.insert("admin".into(), json!(admin));
            record.insert("id".into(), json!(key));
            driver.seed(key, record);
        }

        let model = Model::builder("Test")
            .schema(
                Schema::new()
                    .field("name", Descriptor::string())
                    .field("email", Descriptor::string())
                    .field("admin", Descriptor::boolean().with_default(true)),
            )
            .driver(driver.clone())
            .build()
            .unwrap();

        (model, driver)
    }

    #[tokio::test]
    async fn test_get_materializes_a_persisted_instance() {
        let (model, _driver) = seeded_model();

        let instance = model.get("test").await.unwrap();
        assert_eq!(instance.get("name"), Some(json!("Test Inst")));
        assert!(instance.exists());
        assert!(!instance.is_dirty());
    }

    #[tokio::test]
    async fn test_get_missing_key_is_document_not_found() {
        let (model, _driver) = seeded_model();

        let err = model.get("dne").await.unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound { pk, model } if pk == json!("dne") && model == "Test"));
    }

    #[tokio::test]
    async fn test_all_materializes_every_record() {
        let (model, _driver) = seeded_model();

        let instances = model.all().await.unwrap();
        assert_eq!(instances.len(), 3);
        assert!(instances.iter().all(|i| i.exists() && !i.is_dirty()));
    }

    #[tokio::test]
    async fn test_filter_materializes_matches() {
        let (model, _driver) = seeded_model();

        let admins = model.filter(Predicate::eq("admin", false)).await.unwrap();
        assert_eq!(admins.len(), 2);
        assert!(admins.iter().all(|i| i.exists()));
    }

    #[tokio::test]
    async fn test_remove_passes_through() {
        let (model, driver) = seeded_model();

        model.remove(Predicate::eq("admin", true)).await.unwrap();
        assert_eq!(driver.len(), 2);

        model.remove_all().await.unwrap();
        assert!(driver.is_empty());
    }
}
