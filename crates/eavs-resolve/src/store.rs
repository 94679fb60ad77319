//! # Resolution Store
//!
//! Memoizes path resolutions. The store is injectable so tests can pre-seed
//! or clear it, and hosts can share one store between resolvers.
//!
//! Concurrent first resolution of the same path may build the schema twice;
//! the last write wins and both results behave identically.

use std::collections::HashMap;
use std::sync::Arc;

use eavs_core::SchemaDefinition;
use parking_lot::RwLock;

use crate::path::SchemaPath;

/// Cache of resolved schemas keyed by dotted path.
pub trait SchemaStore: Send + Sync {
    fn get(&self, path: &SchemaPath) -> Option<Arc<SchemaDefinition>>;

    /// Store `schema` under `path`, overwriting any previous entry.
    fn insert(&self, path: SchemaPath, schema: Arc<SchemaDefinition>);

    fn remove(&self, path: &SchemaPath) -> Option<Arc<SchemaDefinition>>;

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store behind a read-write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<SchemaPath, Arc<SchemaDefinition>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SchemaStore for MemoryStore {
    fn get(&self, path: &SchemaPath) -> Option<Arc<SchemaDefinition>> {
        self.entries.read().get(path).cloned()
    }

    fn insert(&self, path: SchemaPath, schema: Arc<SchemaDefinition>) {
        self.entries.write().insert(path, schema);
    }

    fn remove(&self, path: &SchemaPath) -> Option<Arc<SchemaDefinition>> {
        self.entries.write().remove(path)
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}
