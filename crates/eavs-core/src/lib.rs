//! # eavs-core — Schema Definition and Validation Engine
//!
//! Declarative schemas for semi-structured JSON attributes. A schema is a
//! named, ordered set of typed attributes; validating raw input against it
//! yields either the cleaned object in its stored JSON form or a
//! field-keyed [`ValidationError`] listing everything that is wrong.
//!
//! ## Key Design Principles
//!
//! 1. **Closed set of attribute kinds.** [`AttributeType`] is an enum over
//!    string, boolean, integer, float and fixed-point decimal. Adding a kind
//!    forces every `match` to handle it.
//!
//! 2. **Type before coercion before constraints.** A value that has the
//!    wrong JSON type never reaches coercion; a value that fails coercion
//!    never reaches constraints or choices.
//!
//! 3. **Decimals never pass through binary floating point.** Fixed-point
//!    values are parsed with `rust_decimal` and stored as text.
//!
//! 4. **Immutable, shareable definitions.** A built [`SchemaDefinition`]
//!    never changes. Inherited attributes are shared by `Arc`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `eavs-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No I/O. Logging is `tracing` events only; no subscriber is installed.

pub mod attribute;
pub mod attribute_set;
pub mod describe;
pub mod error;
pub mod schema;
pub mod validate;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use attribute::{Attribute, AttributeKind, AttributeType};
pub use attribute_set::AttributeSet;
pub use describe::{label_for, AttributeDescriptor, ControlHint, SchemaDescriptor};
pub use error::{DefinitionError, ErrorKind, FieldError, ValidationError, NON_FIELD_ERRORS};
pub use schema::{CrossFieldHook, SchemaBuilder, SchemaDefinition};
pub use value::{AttrValue, CleanedData};
