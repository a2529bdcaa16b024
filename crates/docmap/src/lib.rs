//! docmap - a minimal, driver-agnostic object-document mapper.
//!
//! Declare a schema of typed fields, attach a storage driver, and get
//! model objects with load/save/validate/delete operations. Persistence
//! is entirely delegated to the driver; the mapping layer only speaks the
//! async [`Driver`] contract.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use docmap::{Descriptor, Document, MemoryDriver, Model, Schema};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), docmap::Error> {
//! let model = Model::builder("Author")
//!     .schema(
//!         Schema::new()
//!             .field("name", Descriptor::string().required())
//!             .field("email", Descriptor::string().primary_key())
//!             .field("admin", Descriptor::boolean().with_default(false)),
//!     )
//!     .driver(Arc::new(MemoryDriver::new()))
//!     .build()?;
//!
//! let mut initial = Document::new();
//! initial.insert("name".into(), json!("Chris"));
//! initial.insert("email".into(), json!("chris@example.com"));
//!
//! let mut author = model.create(initial)?;
//! author.save().await?;
//!
//! let found = model.get("chris@example.com").await?;
//! assert_eq!(found.get("admin"), Some(json!(false)));
//! # Ok(())
//! # }
//! ```

pub use docmap_core::{
    CompiledSchema, Descriptor, Document, Driver, DriverError, Error, Instance, Lookup,
    MemoryDriver, Model, ModelBuilder, ModelConfig, Predicate, SanitizeFn, Schema, TypeKind,
    ValidateFn,
};

/// Convenience imports for the common case.
pub mod prelude {
    pub use docmap_core::{
        Descriptor, Document, Driver, Error, Instance, Lookup, MemoryDriver, Model, Predicate,
        Schema, TypeKind,
    };
}
