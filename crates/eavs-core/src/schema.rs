//! # Schema Definitions
//!
//! A [`SchemaDefinition`] is a named, immutable collection of attributes
//! plus an optional cross-field hook. Definitions are assembled with
//! [`SchemaDefinition::builder`]:
//!
//! ```
//! use eavs_core::{Attribute, SchemaDefinition, ValidationError};
//!
//! let bounds = SchemaDefinition::builder("RangeConfig")
//!     .module("billing.schemas")
//!     .attribute("min_val", Attribute::integer())
//!     .attribute("max_val", Attribute::integer())
//!     .validate_cross(|data| {
//!         match (data.get_i64("min_val"), data.get_i64("max_val")) {
//!             (Some(lo), Some(hi)) if lo >= hi => Err(ValidationError::cross_field(
//!                 "max_val",
//!                 "max_val must be greater than min_val.",
//!             )),
//!             _ => Ok(()),
//!         }
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(bounds.qualified_name().as_deref(), Some("billing.schemas.RangeConfig"));
//! ```
//!
//! ## Inheritance
//!
//! `extends` may be called any number of times. The resolved attribute set
//! follows the rules of [`AttributeSet`]. A child without its own cross-field
//! hook inherits the hook of its last parent that has one.

use std::fmt;
use std::sync::Arc;

use crate::attribute::Attribute;
use crate::attribute_set::AttributeSet;
use crate::error::{DefinitionError, ValidationError};
use crate::value::CleanedData;

/// Cross-field rule run on the typed values after every attribute passed.
pub type CrossFieldHook = Arc<dyn Fn(&CleanedData) -> Result<(), ValidationError> + Send + Sync>;

/// An immutable schema: ordered attributes plus an optional cross-field hook.
#[derive(Clone)]
pub struct SchemaDefinition {
    name: String,
    module: Option<String>,
    attributes: AttributeSet,
    cross: Option<CrossFieldHook>,
}

impl SchemaDefinition {
    /// Start declaring a schema called `name`.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            module: None,
            parents: Vec::new(),
            attributes: Vec::new(),
            cross: None,
        }
    }

    /// The type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted module path the schema is published under, if any.
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// `module.Name`, if a module is set. This is the persistable reference.
    pub fn qualified_name(&self) -> Option<String> {
        self.module.as_ref().map(|m| format!("{m}.{}", self.name))
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn has_cross_validation(&self) -> bool {
        self.cross.is_some()
    }

    pub(crate) fn cross_hook(&self) -> Option<&CrossFieldHook> {
        self.cross.as_ref()
    }
}

impl fmt::Debug for SchemaDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDefinition")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("attributes", &self.attributes.names().collect::<Vec<_>>())
            .field("cross", &self.cross.is_some())
            .finish()
    }
}

/// Declarative builder for [`SchemaDefinition`].
#[must_use]
pub struct SchemaBuilder {
    name: String,
    module: Option<String>,
    parents: Vec<Arc<SchemaDefinition>>,
    attributes: Vec<(String, Attribute)>,
    cross: Option<CrossFieldHook>,
}

impl SchemaBuilder {
    /// Publish the schema under a dotted module path.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Inherit every attribute of `parent`.
    pub fn extends(mut self, parent: impl Into<Arc<SchemaDefinition>>) -> Self {
        self.parents.push(parent.into());
        self
    }

    /// Declare an attribute. Declaration order is preserved.
    pub fn attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.push((name.into(), attribute));
        self
    }

    /// Install a cross-field rule, replacing any inherited one.
    pub fn validate_cross<F>(mut self, hook: F) -> Self
    where
        F: Fn(&CleanedData) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.cross = Some(Arc::new(hook));
        self
    }

    /// Resolve inheritance and check every declaration.
    pub fn build(self) -> Result<SchemaDefinition, DefinitionError> {
        if self.name.trim().is_empty() {
            return Err(DefinitionError::EmptySchemaName);
        }
        if self.name.contains('.') {
            return Err(DefinitionError::DottedSchemaName { name: self.name });
        }

        let parent_sets: Vec<&AttributeSet> = self.parents.iter().map(|p| &p.attributes).collect();
        let attributes = AttributeSet::collect(&self.name, &parent_sets, self.attributes)?;

        let cross = self
            .cross
            .or_else(|| self.parents.iter().rev().find_map(|p| p.cross.clone()));

        tracing::debug!(
            schema = %self.name,
            attributes = attributes.len(),
            parents = self.parents.len(),
            "schema built"
        );

        Ok(SchemaDefinition {
            name: self.name,
            module: self.module,
            attributes,
            cross,
        })
    }
}

impl fmt::Debug for SchemaBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaBuilder")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("parents", &self.parents.len())
            .field("attributes", &self.attributes.len())
            .finish()
    }
}
