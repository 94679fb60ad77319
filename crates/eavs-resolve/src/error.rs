//! # Error Types: Resolution Failures
//!
//! [`ResolveError`] covers everything that can go wrong between a schema
//! reference and a usable [`SchemaDefinition`](eavs_core::SchemaDefinition):
//! malformed paths, missing modules or exports, exports that are not
//! schemas, unmapped discriminators and bad binding or manifest
//! configuration.
//!
//! [`EavError`] is the union returned where either resolution or data
//! validation may fail.

use eavs_core::{DefinitionError, ValidationError};
use thiserror::Error;

/// Failure to turn a schema reference into a schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    /// The dotted path is not of the form `module.TypeName`.
    #[error("invalid schema path '{path}': {reason}")]
    InvalidPath {
        /// Path as given.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// No module of that name is registered in the catalog.
    #[error("schema module '{module}' not found")]
    ModuleNotFound {
        /// Dotted module path.
        module: String,
    },

    /// The module exists but does not export the name.
    #[error("module '{module}' has no export named '{name}'")]
    MissingExport {
        /// Dotted module path.
        module: String,
        /// Requested export.
        name: String,
    },

    /// The export exists but is not a schema definition.
    #[error("'{path}' is not a schema definition (found {found})")]
    NotASchema {
        /// Full dotted path.
        path: String,
        /// Description of what was found instead.
        found: String,
    },

    /// The export is a schema whose declaration is invalid.
    #[error("schema '{path}' could not be built: {source}")]
    Definition {
        /// Full dotted path.
        path: String,
        /// Underlying declaration error.
        #[source]
        source: DefinitionError,
    },

    /// A direct schema handle has no module, so it has no persistable path.
    #[error("schema '{schema}' has no module path and cannot be referenced by path")]
    Unserializable {
        /// Schema type name.
        schema: String,
    },

    /// The discriminator value has no schema in the polymorphic map.
    #[error("{}", unknown_discriminator_message(.field, .value.as_deref()))]
    UnknownDiscriminator {
        /// Sibling field that supplies the discriminator.
        field: String,
        /// Observed value, if any.
        value: Option<String>,
    },

    /// A storage binding was configured inconsistently.
    #[error("invalid schema binding: {0}")]
    InvalidBinding(String),

    /// A manifest could not be parsed or contains an invalid declaration.
    #[error("invalid schema manifest: {0}")]
    Manifest(String),

    /// Manifest schemas extend each other in a cycle.
    #[error("schema '{path}' extends itself through its parents")]
    InheritanceCycle {
        /// A schema on the cycle.
        path: String,
    },
}

fn unknown_discriminator_message(field: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => format!("no schema registered for {field} value '{value}'"),
        None => format!("no schema can be selected: {field} has no value"),
    }
}

impl ResolveError {
    /// Whether this error means a reference could not be resolved.
    pub fn is_unresolved_reference(&self) -> bool {
        matches!(
            self,
            ResolveError::InvalidPath { .. }
                | ResolveError::ModuleNotFound { .. }
                | ResolveError::MissingExport { .. }
                | ResolveError::NotASchema { .. }
                | ResolveError::Definition { .. }
        )
    }
}

/// Either a resolution failure or a data validation failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EavError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl EavError {
    /// The validation errors, if data was rejected.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            EavError::Validation(err) => Some(err),
            EavError::Resolve(_) => None,
        }
    }
}
