//! # eavs-resolve — Schema References and Selection
//!
//! Everything between "which schema applies here?" and a built
//! [`SchemaDefinition`](eavs_core::SchemaDefinition):
//!
//! - [`SchemaPath`]: validated dotted path, the persisted form of a
//!   schema reference.
//! - [`SchemaCatalog`]: module path to named exports, the lookup table
//!   paths are resolved against. Populated in code or from manifests.
//! - [`SchemaResolver`]: resolves [`SchemaReference`]s and memoizes path
//!   lookups in an injectable [`SchemaStore`].
//! - [`PolymorphicSelector`]: picks a schema from a [`PolymorphicMap`] by
//!   the value of a sibling field.
//! - [`SchemaBinding`]: the storage-field boundary tying the above to a
//!   stored JSON value.
//!
//! ## Crate Policy
//!
//! - Depends only on `eavs-core` internally.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Shared state is limited to the catalog and the store, both behind
//!   `parking_lot::RwLock`.

pub mod binding;
pub mod catalog;
pub mod error;
pub mod manifest;
pub mod path;
pub mod polymorphic;
pub mod resolver;
pub mod store;

// Re-export primary types for ergonomic imports.
pub use binding::{BindingConfig, BindingDescriptor, SchemaBinding, VariantDescriptor};
pub use catalog::{Export, SchemaCatalog, SchemaFactory};
pub use error::{EavError, ResolveError};
pub use manifest::{attribute_spec, schema_spec, AttributeSpec, Manifest, SchemaSpec};
pub use path::SchemaPath;
pub use polymorphic::{PolymorphicMap, PolymorphicSelector};
pub use resolver::{SchemaReference, SchemaResolver};
pub use store::{MemoryStore, SchemaStore};
