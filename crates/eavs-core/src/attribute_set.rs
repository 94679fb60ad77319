//! # Attribute Sets: Collection and Inheritance
//!
//! An [`AttributeSet`] is the resolved, ordered mapping from attribute name
//! to [`Attribute`] for one schema.
//!
//! ## Merge order
//!
//! Parents are merged first, in the order they are listed, then the
//! schema's own declarations. A parent's set is already resolved, so
//! merging it walks that parent's whole ancestry most-ancestral first.
//! When a name is declared again, the new attribute replaces the old one
//! entirely and moves to the position of the new declaration.
//!
//! Inherited attributes are shared by `Arc`, never copied.

use std::sync::Arc;

use crate::attribute::Attribute;
use crate::error::{DefinitionError, NON_FIELD_ERRORS};

/// Ordered, name-unique collection of attributes.
#[derive(Debug, Clone, Default)]
pub struct AttributeSet {
    entries: Vec<(String, Arc<Attribute>)>,
}

impl AttributeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the attribute set of schema `schema` from its parents' sets
    /// and its own declarations (in source order).
    pub fn collect(
        schema: &str,
        parents: &[&AttributeSet],
        own: Vec<(String, Attribute)>,
    ) -> Result<Self, DefinitionError> {
        let mut set = Self::new();
        for parent in parents {
            set.inherit(parent);
        }

        let mut declared: Vec<&str> = Vec::with_capacity(own.len());
        for (name, _) in &own {
            validate_name(schema, name)?;
            if declared.contains(&name.as_str()) {
                return Err(DefinitionError::DuplicateAttribute {
                    schema: schema.to_string(),
                    attribute: name.clone(),
                });
            }
            declared.push(name);
        }

        for (name, attribute) in own {
            let attribute = attribute.finalize().map_err(|reason| DefinitionError::InvalidConstraint {
                schema: schema.to_string(),
                attribute: name.clone(),
                reason,
            })?;
            set.insert(name, Arc::new(attribute));
        }
        Ok(set)
    }

    /// Merge every attribute of `parent`, sharing the instances.
    pub fn inherit(&mut self, parent: &AttributeSet) {
        for (name, attribute) in &parent.entries {
            self.insert(name.clone(), Arc::clone(attribute));
        }
    }

    /// Insert `attribute` under `name`, replacing and repositioning any
    /// existing entry of that name.
    pub fn insert(&mut self, name: String, attribute: Arc<Attribute>) {
        if let Some(pos) = self.position(&name) {
            self.entries.remove(pos);
        }
        self.entries.push((name, attribute));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.get_shared(name).map(Arc::as_ref)
    }

    /// The shared handle of `name`, for identity comparisons.
    pub fn get_shared(&self, name: &str) -> Option<&Arc<Attribute>> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attribute names in resolved order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// `(name, attribute)` pairs in resolved order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.entries.iter().map(|(n, a)| (n.as_str(), a.as_ref()))
    }
}

fn validate_name(schema: &str, name: &str) -> Result<(), DefinitionError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name == NON_FIELD_ERRORS {
        "name is reserved for non-field errors"
    } else if name.chars().any(char::is_whitespace) {
        "name contains whitespace"
    } else {
        return Ok(());
    };
    Err(DefinitionError::InvalidAttributeName {
        schema: schema.to_string(),
        attribute: name.to_string(),
        reason: reason.to_string(),
    })
}
