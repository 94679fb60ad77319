//! # Polymorphic Selection
//!
//! A [`PolymorphicMap`] ties the value of a sibling field (the
//! discriminator) to the schema that applies. [`PolymorphicSelector`]
//! picks the schema for an observed value and resolves it.
//!
//! A missing discriminator or one without a mapped schema is an error.
//! Data is never accepted without a schema to check it against.

use std::collections::BTreeMap;
use std::sync::Arc;

use eavs_core::SchemaDefinition;

use crate::error::ResolveError;
use crate::resolver::{SchemaReference, SchemaResolver};

/// Discriminator value to schema reference, plus the discriminator field.
#[derive(Debug, Clone)]
pub struct PolymorphicMap {
    discriminator_field: String,
    variants: BTreeMap<String, SchemaReference>,
}

impl PolymorphicMap {
    /// Empty map keyed by the value of `discriminator_field`.
    pub fn new(discriminator_field: impl Into<String>) -> Self {
        Self {
            discriminator_field: discriminator_field.into(),
            variants: BTreeMap::new(),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn variant(mut self, value: impl Into<String>, reference: impl Into<SchemaReference>) -> Self {
        self.insert(value, reference);
        self
    }

    pub fn insert(&mut self, value: impl Into<String>, reference: impl Into<SchemaReference>) {
        self.variants.insert(value.into(), reference.into());
    }

    pub fn discriminator_field(&self) -> &str {
        &self.discriminator_field
    }

    pub fn get(&self, value: &str) -> Option<&SchemaReference> {
        self.variants.get(value)
    }

    /// Discriminator values, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaReference)> {
        self.variants.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Chooses the schema for a discriminator value.
#[derive(Debug, Clone, Copy)]
pub struct PolymorphicSelector<'a> {
    resolver: &'a SchemaResolver,
}

impl<'a> PolymorphicSelector<'a> {
    pub fn new(resolver: &'a SchemaResolver) -> Self {
        Self { resolver }
    }

    /// Select and resolve the schema registered for `value`.
    pub fn select(
        &self,
        value: Option<&str>,
        map: &PolymorphicMap,
    ) -> Result<Arc<SchemaDefinition>, ResolveError> {
        let unknown = || ResolveError::UnknownDiscriminator {
            field: map.discriminator_field.clone(),
            value: value.map(str::to_string),
        };
        let reference = value.and_then(|v| map.get(v)).ok_or_else(unknown)?;
        self.resolver.resolve(reference)
    }
}
