//! The instance state machine: construction, dirty/exists tracking, and
//! the save/reload/delete lifecycle.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::driver::{Lookup, Predicate};
use crate::error::Error;
use crate::schema::coerce_timestamp;
use crate::Document;

use super::config::ModelConfig;

/// One potentially-persisted record.
///
/// An instance is either *new* (`exists() == false`) or *persisted*
/// (`exists() == true`); `is_dirty()` is an orthogonal, advisory bit
/// meaning "has unsaved local mutation". Field values live in a single
/// backing record; accessors only proxy into it.
#[derive(Debug)]
pub struct Instance {
    config: Arc<ModelConfig>,
    values: Document,
    dirty: bool,
    exists: bool,
}

impl Instance {
    /// Construct a new, unsaved instance from initial data, routing every
    /// field through the compiled accessors.
    pub(crate) fn new(config: Arc<ModelConfig>, initial: Document) -> Result<Self, Error> {
        let mut instance = Self {
            config,
            values: Document::new(),
            dirty: true,
            exists: false,
        };

        for (field, value) in initial {
            instance.set(&field, value)?;
        }

        Ok(instance)
    }

    /// Wrap a raw driver record. The record is taken wholesale and the
    /// instance starts persisted and clean.
    pub(crate) fn materialized(config: Arc<ModelConfig>, record: Document) -> Self {
        Self {
            config,
            values: record,
            dirty: false,
            exists: true,
        }
    }

    /// Name of the model this instance belongs to.
    pub fn model_name(&self) -> &str {
        self.config.name()
    }

    /// Whether the instance has unsaved local mutation.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the record is known to be present in the backing store
    /// under its current primary key.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// The raw backing record.
    pub fn values(&self) -> &Document {
        &self.values
    }

    /// Read a field through its descriptor, or a shared constant.
    pub fn get(&self, field: &str) -> Option<Value> {
        let schema = self.config.schema();
        match schema.descriptor(field) {
            Some(descriptor) => descriptor.read(&self.values, field),
            None => schema.constant(field).cloned(),
        }
    }

    /// Read a date field as a calendar instant.
    pub fn get_datetime(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field)
            .and_then(|v| coerce_timestamp(&v))
            .and_then(DateTime::from_timestamp_millis)
    }

    /// Write a field through its descriptor.
    ///
    /// A landed write marks the instance dirty; writing the primary-key
    /// field additionally marks it as no longer existing (a key change
    /// means this is logically a different, unsaved record).
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), Error> {
        let config = self.config.clone();
        let Some(descriptor) = config.schema().descriptor(field) else {
            return Err(Error::unknown_field(field, config.name()));
        };

        if descriptor.write(&mut self.values, field, value.into()) {
            self.dirty = true;
            if field == config.schema().primary_key() {
                self.exists = false;
            }
        }

        Ok(())
    }

    /// The current primary-key value, if assigned.
    pub fn pk(&self) -> Option<&Value> {
        self.values.get(self.config.schema().primary_key())
    }

    /// Assign the primary key directly into the backing record, marking
    /// the instance dirty and not existing.
    pub fn set_pk(&mut self, value: impl Into<Value>) {
        let field = self.config.schema().primary_key().to_owned();
        self.values.insert(field, value.into());
        self.dirty = true;
        self.exists = false;
    }

    /// Run every typed field's validation. The first failure propagates;
    /// no state transition either way.
    pub fn validate(&self) -> Result<(), Error> {
        let config = self.config.clone();
        for (field, descriptor) in config.schema().fields() {
            descriptor.validate_field(self, field)?;
        }
        Ok(())
    }

    /// Validate, then persist the backing record through the driver.
    ///
    /// Validation failures propagate before anything is written. The
    /// driver returns the effective primary key (generated when none was
    /// assigned), which is written back into the raw record. On success
    /// the instance is persisted and clean.
    pub async fn save(&mut self) -> Result<(), Error> {
        self.validate()?;

        let config = self.config.clone();
        let pk_field = config.schema().primary_key();
        let pk = self
            .values
            .get(pk_field)
            .cloned()
            .filter(|v| !v.is_null());

        let effective = config.driver().set(pk.as_ref(), &self.values).await?;
        self.values.insert(pk_field.to_owned(), effective);
        self.exists = true;
        self.dirty = false;

        tracing::debug!(model = config.name(), "saved instance");
        Ok(())
    }

    /// Replace the backing record with a fresh copy fetched by primary
    /// key. The instance ends persisted and clean.
    pub async fn reload(&mut self) -> Result<(), Error> {
        let config = self.config.clone();
        let pk = self
            .values
            .get(config.schema().primary_key())
            .cloned()
            .unwrap_or(Value::Null);

        match config.driver().get(&pk).await? {
            Lookup::One(record) => {
                self.values = record;
                self.exists = true;
                self.dirty = false;
                tracing::debug!(model = config.name(), "reloaded instance");
                Ok(())
            }
            Lookup::None => Err(Error::document_not_found(pk, config.name())),
            Lookup::Many(_) => Err(Error::multiple_documents(pk, config.name())),
        }
    }

    /// Remove the record from the backing store and clear the primary
    /// key, leaving the instance new and dirty.
    ///
    /// Only valid on a persisted instance.
    pub async fn delete(&mut self) -> Result<(), Error> {
        if !self.exists {
            return Err(Error::NotPersisted {
                model: self.config.name().to_owned(),
            });
        }

        let config = self.config.clone();
        let pk_field = config.schema().primary_key();
        let pk = self.values.get(pk_field).cloned().unwrap_or(Value::Null);

        let mut selector = Document::new();
        selector.insert(pk_field.to_owned(), pk);
        config.driver().remove(&Predicate::matches(selector)).await?;

        self.values.remove(pk_field);
        self.dirty = true;
        self.exists = false;

        tracing::debug!(model = config.name(), "deleted instance");
        Ok(())
    }

    /// A deep copy of this instance without its primary key, in the new,
    /// unsaved state. No driver interaction.
    pub fn duplicate(&self) -> Instance {
        let mut values = self.values.clone();
        values.remove(self.config.schema().primary_key());

        Instance {
            config: self.config.clone(),
            values,
            dirty: true,
            exists: false,
        }
    }

    /// The externally visible representation: the backing record with
    /// every `$`-prefixed bookkeeping key stripped, descending into
    /// nested records.
    pub fn to_json(&self) -> Value {
        Value::Object(strip_internal(&self.values))
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn strip_internal(record: &Document) -> Document {
    record
        .iter()
        .filter(|(key, _)| !key.starts_with('$'))
        .map(|(key, value)| {
            let value = match value {
                Value::Object(nested) => Value::Object(strip_internal(nested)),
                other => other.clone(),
            };
            (key.clone(), value)
        })
        .collect()
}
