//! docmap core - typed schemas, the model lifecycle, and the storage driver contract.
//!
//! This crate provides the core mapping functionality for docmap: field
//! descriptors, schema compilation, the model instance state machine, and
//! the async driver interface models persist through.

pub mod driver;
pub mod error;
pub mod model;
pub mod schema;

pub use driver::{Driver, Lookup, MemoryDriver, Predicate};
pub use error::{DriverError, Error};
pub use model::{Instance, Model, ModelBuilder, ModelConfig};
pub use schema::{CompiledSchema, Descriptor, SanitizeFn, Schema, TypeKind, ValidateFn};

/// A raw record: field names mapped to JSON values.
pub type Document = serde_json::Map<String, serde_json::Value>;
