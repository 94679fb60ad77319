//! # Schema Resolver
//!
//! Turns a [`SchemaReference`] into a concrete schema. Direct handles are
//! returned as they are. Paths are loaded from the [`SchemaCatalog`] on
//! first use and memoized in the [`SchemaStore`].

use std::fmt;
use std::sync::Arc;

use eavs_core::SchemaDefinition;

use crate::catalog::SchemaCatalog;
use crate::error::ResolveError;
use crate::path::SchemaPath;
use crate::store::{MemoryStore, SchemaStore};

/// A schema given either directly or by dotted path.
#[derive(Debug, Clone)]
pub enum SchemaReference {
    Direct(Arc<SchemaDefinition>),
    Path(SchemaPath),
}

impl SchemaReference {
    /// Parse a dotted path reference.
    pub fn path(path: &str) -> Result<Self, ResolveError> {
        SchemaPath::new(path).map(SchemaReference::Path)
    }

    /// The persistable dotted path of this reference.
    ///
    /// Direct handles need a module to have one.
    pub fn to_path(&self) -> Result<SchemaPath, ResolveError> {
        match self {
            SchemaReference::Path(path) => Ok(path.clone()),
            SchemaReference::Direct(schema) => {
                let module = schema.module().ok_or_else(|| ResolveError::Unserializable {
                    schema: schema.name().to_string(),
                })?;
                SchemaPath::from_parts(module, schema.name())
            }
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, SchemaReference::Direct(_))
    }
}

impl From<SchemaDefinition> for SchemaReference {
    fn from(schema: SchemaDefinition) -> Self {
        SchemaReference::Direct(Arc::new(schema))
    }
}

impl From<Arc<SchemaDefinition>> for SchemaReference {
    fn from(schema: Arc<SchemaDefinition>) -> Self {
        SchemaReference::Direct(schema)
    }
}

impl From<SchemaPath> for SchemaReference {
    fn from(path: SchemaPath) -> Self {
        SchemaReference::Path(path)
    }
}

impl fmt::Display for SchemaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaReference::Path(path) => write!(f, "{path}"),
            SchemaReference::Direct(schema) => match schema.qualified_name() {
                Some(name) => f.write_str(&name),
                None => f.write_str(schema.name()),
            },
        }
    }
}

/// Resolves references against a catalog, memoizing path lookups.
#[derive(Clone)]
pub struct SchemaResolver {
    catalog: Arc<SchemaCatalog>,
    store: Arc<dyn SchemaStore>,
}

impl SchemaResolver {
    /// Resolver with a fresh in-memory store.
    pub fn new(catalog: Arc<SchemaCatalog>) -> Self {
        Self::with_store(catalog, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(catalog: Arc<SchemaCatalog>, store: Arc<dyn SchemaStore>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &Arc<SchemaCatalog> {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<dyn SchemaStore> {
        &self.store
    }

    pub fn resolve(&self, reference: &SchemaReference) -> Result<Arc<SchemaDefinition>, ResolveError> {
        match reference {
            SchemaReference::Direct(schema) => Ok(Arc::clone(schema)),
            SchemaReference::Path(path) => self.resolve_path(path),
        }
    }

    pub fn resolve_path(&self, path: &SchemaPath) -> Result<Arc<SchemaDefinition>, ResolveError> {
        if let Some(schema) = self.store.get(path) {
            tracing::debug!(path = %path, "schema resolved from store");
            return Ok(schema);
        }

        tracing::debug!(path = %path, "schema not in store, loading from catalog");
        let schema = Arc::new(self.catalog.load(path)?);
        self.store.insert(path.clone(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Parse `path` and resolve it.
    pub fn resolve_str(&self, path: &str) -> Result<Arc<SchemaDefinition>, ResolveError> {
        self.resolve_path(&SchemaPath::new(path)?)
    }
}

impl fmt::Debug for SchemaResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaResolver")
            .field("catalog", &self.catalog)
            .field("cached", &self.store.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eavs_core::Attribute;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_catalog(builds: Arc<AtomicUsize>) -> Arc<SchemaCatalog> {
        let catalog = SchemaCatalog::new();
        catalog
            .register_schema("app.schemas", "Config", move || {
                builds.fetch_add(1, Ordering::SeqCst);
                SchemaDefinition::builder("Config")
                    .module("app.schemas")
                    .attribute("enabled", Attribute::boolean().default(false))
                    .build()
            })
            .unwrap();
        Arc::new(catalog)
    }

    #[test]
    fn test_direct_reference_is_returned_unchanged() {
        let resolver = SchemaResolver::new(Arc::new(SchemaCatalog::new()));
        let schema = Arc::new(SchemaDefinition::builder("Inline").build().unwrap());
        let resolved = resolver
            .resolve(&SchemaReference::Direct(Arc::clone(&schema)))
            .unwrap();
        assert!(Arc::ptr_eq(&resolved, &schema));
        assert!(resolver.store().is_empty());
    }

    #[test]
    fn test_path_resolution_is_memoized() {
        let builds = Arc::new(AtomicUsize::new(0));
        let resolver = SchemaResolver::new(counting_catalog(Arc::clone(&builds)));

        let first = resolver.resolve_str("app.schemas.Config").unwrap();
        let second = resolver.resolve_str("app.schemas.Config").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        resolver.store().clear();
        resolver.resolve_str("app.schemas.Config").unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_pre_seeded_store_wins() {
        let builds = Arc::new(AtomicUsize::new(0));
        let store: Arc<dyn SchemaStore> = Arc::new(MemoryStore::new());
        let seeded = Arc::new(SchemaDefinition::builder("Seeded").build().unwrap());
        store.insert(SchemaPath::new("app.schemas.Config").unwrap(), Arc::clone(&seeded));

        let resolver = SchemaResolver::with_store(counting_catalog(Arc::clone(&builds)), store);
        let resolved = resolver.resolve_str("app.schemas.Config").unwrap();
        assert!(Arc::ptr_eq(&resolved, &seeded));
        assert_eq!(builds.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let resolver = SchemaResolver::new(Arc::new(SchemaCatalog::new()));
        assert!(resolver.resolve_str("app.Missing").unwrap_err().is_unresolved_reference());
        assert!(resolver.store().is_empty());
        assert!(matches!(
            resolver.resolve_str("Missing"),
            Err(ResolveError::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_reference_to_path() {
        let qualified = SchemaDefinition::builder("Config").module("app").build().unwrap();
        assert_eq!(
            SchemaReference::from(qualified).to_path().unwrap().as_str(),
            "app.Config"
        );

        let loose = SchemaDefinition::builder("Loose").build().unwrap();
        assert!(matches!(
            SchemaReference::from(loose).to_path(),
            Err(ResolveError::Unserializable { .. })
        ));

        let by_path = SchemaReference::path("app.Other").unwrap();
        assert!(!by_path.is_direct());
        assert_eq!(by_path.to_string(), "app.Other");
    }
}
