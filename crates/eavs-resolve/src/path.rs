//! # Schema Paths
//!
//! A [`SchemaPath`] is the textual, persistable form of a schema reference:
//! a dotted module path followed by the exported type name, for example
//! `billing.schemas.InstallmentConfig`.
//!
//! Every segment must be an identifier (ASCII letter or `_`, then letters,
//! digits or `_`) and there must be at least two segments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Validated dotted path `module.path.TypeName`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SchemaPath {
    raw: String,
    split: usize,
}

impl SchemaPath {
    /// Parse and validate a dotted path.
    pub fn new(path: impl Into<String>) -> Result<Self, ResolveError> {
        let raw = path.into();
        let invalid = |reason: &str| ResolveError::InvalidPath {
            path: raw.clone(),
            reason: reason.to_string(),
        };

        let split = raw
            .rfind('.')
            .ok_or_else(|| invalid("expected 'module.TypeName'"))?;
        if let Some(segment) = raw.split('.').find(|s| !is_identifier(s)) {
            return Err(if segment.is_empty() {
                invalid("empty path segment")
            } else {
                invalid(&format!("'{segment}' is not an identifier"))
            });
        }
        Ok(Self { raw, split })
    }

    /// Build a path from a module path and a type name.
    ///
    /// `type_name` must be a single identifier; a dotted name would be
    /// re-split into a different module.
    pub fn from_parts(module: &str, type_name: &str) -> Result<Self, ResolveError> {
        if !is_identifier(type_name) {
            return Err(ResolveError::InvalidPath {
                path: format!("{module}.{type_name}"),
                reason: format!("type name '{type_name}' is not an identifier"),
            });
        }
        Self::new(format!("{module}.{type_name}"))
    }

    /// Dotted module part, e.g. `billing.schemas`.
    pub fn module(&self) -> &str {
        &self.raw[..self.split]
    }

    /// Exported name, e.g. `InstallmentConfig`.
    pub fn type_name(&self) -> &str {
        &self.raw[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl FromStr for SchemaPath {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for SchemaPath {
    type Error = ResolveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SchemaPath> for String {
    fn from(path: SchemaPath) -> Self {
        path.raw
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
