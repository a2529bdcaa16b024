//! Immutable per-model configuration and the model builder.

use std::fmt;
use std::sync::Arc;

use crate::driver::Driver;
use crate::error::Error;
use crate::schema::{CompiledSchema, Schema};

use super::Model;

/// The resolved configuration shared by every instance of a model: the
/// compiled schema, the storage driver, and the model name (metadata
/// only, used in diagnostics).
///
/// Built once by [`ModelBuilder`] and never mutated afterwards.
pub struct ModelConfig {
    name: String,
    schema: CompiledSchema,
    driver: Arc<dyn Driver>,
}

impl ModelConfig {
    /// The model's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled schema.
    pub fn schema(&self) -> &CompiledSchema {
        &self.schema
    }

    /// The storage driver.
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Builder composing a schema and driver into a [`Model`].
///
/// Both a schema and a driver are mandatory; [`ModelBuilder::build`]
/// fails synchronously with [`Error::Config`] when either is missing.
pub struct ModelBuilder {
    name: String,
    schema: Option<Schema>,
    driver: Option<Arc<dyn Driver>>,
    primary_key: Option<String>,
}

impl ModelBuilder {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            driver: None,
            primary_key: None,
        }
    }

    /// Set the schema declaration.
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Set the storage driver.
    pub fn driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Name the primary-key field directly, overriding descriptor flags.
    /// The named field must be declared in the schema.
    pub fn primary_key(mut self, field: impl Into<String>) -> Self {
        self.primary_key = Some(field.into());
        self
    }

    /// Compile the schema and produce the model.
    pub fn build(self) -> Result<Model, Error> {
        let schema = self
            .schema
            .ok_or_else(|| Error::Config("a schema must be set on the model".into()))?;
        let driver = self
            .driver
            .ok_or_else(|| Error::Config("a driver must be set on the model".into()))?;

        let schema = schema.compile(self.primary_key.as_deref())?;

        Ok(Model::from_config(ModelConfig {
            name: self.name,
            schema,
            driver,
        }))
    }
}
