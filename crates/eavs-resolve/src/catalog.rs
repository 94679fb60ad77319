//! # Schema Catalog
//!
//! The catalog plays the role of a module loader: it maps dotted module
//! paths to named exports. An export is either a schema factory or some
//! other value, so a path can name something that exists but is not a
//! schema.
//!
//! Schemas are registered as factories and built on load, so a schema
//! whose declaration is invalid fails when referenced, not when
//! registered.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use eavs_core::{DefinitionError, SchemaDefinition};
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::ResolveError;
use crate::path::SchemaPath;

/// Builds a schema on demand.
pub type SchemaFactory = Arc<dyn Fn() -> Result<SchemaDefinition, DefinitionError> + Send + Sync>;

/// A named module member.
#[derive(Clone)]
pub enum Export {
    Schema(SchemaFactory),
    /// Anything else a module may publish.
    Value(Value),
}

impl Export {
    fn describe(&self) -> String {
        match self {
            Export::Schema(_) => "schema".to_string(),
            Export::Value(value) => match value {
                Value::Null => "null".to_string(),
                Value::Bool(_) => "boolean".to_string(),
                Value::Number(_) => "number".to_string(),
                Value::String(_) => "string".to_string(),
                Value::Array(_) => "array".to_string(),
                Value::Object(_) => "object".to_string(),
            },
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Schema(_) => f.write_str("Export::Schema(..)"),
            Export::Value(value) => f.debug_tuple("Export::Value").field(value).finish(),
        }
    }
}

/// Registry of modules and their exports.
#[derive(Default)]
pub struct SchemaCatalog {
    modules: RwLock<HashMap<String, BTreeMap<String, Export>>>,
}

impl SchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema factory under `module.name`, replacing any export
    /// of that name.
    pub fn register_schema<F>(&self, module: &str, name: &str, factory: F) -> Result<(), ResolveError>
    where
        F: Fn() -> Result<SchemaDefinition, DefinitionError> + Send + Sync + 'static,
    {
        let path = SchemaPath::from_parts(module, name)?;
        self.insert(&path, Export::Schema(Arc::new(factory)));
        Ok(())
    }

    /// Register an already built definition under its own qualified name.
    pub fn register(&self, definition: SchemaDefinition) -> Result<SchemaPath, ResolveError> {
        let module = definition.module().ok_or_else(|| ResolveError::Unserializable {
            schema: definition.name().to_string(),
        })?;
        let path = SchemaPath::from_parts(module, definition.name())?;
        let definition = Arc::new(definition);
        self.insert(
            &path,
            Export::Schema(Arc::new(move || Ok(SchemaDefinition::clone(&definition)))),
        );
        Ok(path)
    }

    /// Register a non-schema export.
    pub fn register_value(&self, module: &str, name: &str, value: Value) -> Result<(), ResolveError> {
        let path = SchemaPath::from_parts(module, name)?;
        self.insert(&path, Export::Value(value));
        Ok(())
    }

    pub(crate) fn insert(&self, path: &SchemaPath, export: Export) {
        let previous = self
            .modules
            .write()
            .entry(path.module().to_string())
            .or_default()
            .insert(path.type_name().to_string(), export);
        tracing::debug!(path = %path, replaced = previous.is_some(), "catalog export registered");
    }

    /// Whether `path` names any export.
    pub fn contains(&self, path: &SchemaPath) -> bool {
        self.modules
            .read()
            .get(path.module())
            .is_some_and(|exports| exports.contains_key(path.type_name()))
    }

    /// Registered module paths, sorted.
    pub fn modules(&self) -> Vec<String> {
        let mut modules: Vec<String> = self.modules.read().keys().cloned().collect();
        modules.sort();
        modules
    }

    /// Export names of `module`, sorted.
    pub fn exports(&self, module: &str) -> Option<Vec<String>> {
        self.modules
            .read()
            .get(module)
            .map(|exports| exports.keys().cloned().collect())
    }

    /// Import `path` and build the schema it names.
    pub fn load(&self, path: &SchemaPath) -> Result<SchemaDefinition, ResolveError> {
        let export = {
            let modules = self.modules.read();
            let exports = modules.get(path.module()).ok_or_else(|| ResolveError::ModuleNotFound {
                module: path.module().to_string(),
            })?;
            exports
                .get(path.type_name())
                .cloned()
                .ok_or_else(|| ResolveError::MissingExport {
                    module: path.module().to_string(),
                    name: path.type_name().to_string(),
                })?
        };

        // Factories may consult the catalog, so the lock is released first.
        match export {
            Export::Schema(factory) => factory().map_err(|source| ResolveError::Definition {
                path: path.to_string(),
                source,
            }),
            other => Err(ResolveError::NotASchema {
                path: path.to_string(),
                found: other.describe(),
            }),
        }
    }
}

impl fmt::Debug for SchemaCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCatalog")
            .field("modules", &self.modules())
            .finish()
    }
}
