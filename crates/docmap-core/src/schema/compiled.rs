//! Schema declaration and compilation.
//!
//! A [`Schema`] is declared as an ordered list of entries, then compiled
//! once per model into a [`CompiledSchema`]: an explicit field-accessor
//! table consulted by the generic get/set/validate routines, plus the
//! derived primary-key field.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;

use super::descriptor::Descriptor;

/// Name of the primary-key field synthesized when none is declared.
const SYNTHESIZED_PK: &str = "id";

#[derive(Debug, Clone)]
enum SchemaEntry {
    Field(Descriptor),
    Constant(Value),
}

/// An ordered schema declaration: field name to descriptor or constant.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<(String, SchemaEntry)>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a typed field.
    pub fn field(mut self, name: impl Into<String>, descriptor: Descriptor) -> Self {
        self.entries
            .push((name.into(), SchemaEntry::Field(descriptor)));
        self
    }

    /// Declare a shared constant: readable on every instance, but not
    /// validated, not dirty-tracked, and never serialized or persisted.
    pub fn constant(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .push((name.into(), SchemaEntry::Constant(value.into())));
        self
    }

    /// Number of declared entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compile the declaration into an accessor table.
    ///
    /// Derives the primary key: an explicit `pk_override` wins, else the
    /// first descriptor flagged as primary key in declaration order, else
    /// a String `id` field is synthesized and injected. Compiling the
    /// same declaration twice yields identical behavior.
    pub(crate) fn compile(self, pk_override: Option<&str>) -> Result<CompiledSchema, Error> {
        let mut fields: Vec<(String, Descriptor)> = Vec::new();
        let mut constants: HashMap<String, Value> = HashMap::new();

        for (name, entry) in self.entries {
            if fields.iter().any(|(n, _)| *n == name) || constants.contains_key(&name) {
                return Err(Error::Config(format!("duplicate schema entry '{name}'")));
            }
            match entry {
                SchemaEntry::Field(descriptor) => fields.push((name, descriptor)),
                SchemaEntry::Constant(value) => {
                    constants.insert(name, value);
                }
            }
        }

        let pk = if let Some(name) = pk_override {
            match fields.iter_mut().find(|(n, _)| n == name) {
                Some((_, descriptor)) => descriptor.mark_primary_key(),
                None => {
                    return Err(Error::Config(format!(
                        "primary key field '{name}' is not declared in the schema"
                    )))
                }
            }
            name.to_owned()
        } else if let Some((name, _)) = fields.iter().find(|(_, d)| d.is_primary_key()) {
            name.clone()
        } else {
            fields.push((
                SYNTHESIZED_PK.to_owned(),
                Descriptor::string().primary_key(),
            ));
            SYNTHESIZED_PK.to_owned()
        };

        Ok(CompiledSchema {
            fields: fields
                .into_iter()
                .map(|(name, descriptor)| (name, Arc::new(descriptor)))
                .collect(),
            constants,
            pk,
        })
    }
}

/// A compiled schema: the per-model field-accessor table, shared constant
/// values, and the derived primary-key field name.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    fields: Vec<(String, Arc<Descriptor>)>,
    constants: HashMap<String, Value>,
    pk: String,
}

impl CompiledSchema {
    /// Name of the primary-key field.
    pub fn primary_key(&self) -> &str {
        &self.pk
    }

    /// Look up a typed field's descriptor.
    pub fn descriptor(&self, field: &str) -> Option<&Arc<Descriptor>> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, descriptor)| descriptor)
    }

    /// Look up a shared constant.
    pub fn constant(&self, name: &str) -> Option<&Value> {
        self.constants.get(name)
    }

    /// Iterate typed fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Arc<Descriptor>)> {
        self.fields
            .iter()
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Number of typed fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no typed fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
