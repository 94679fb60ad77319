//! # Storage Bindings
//!
//! A [`SchemaBinding`] is what a storage field holds to know which schema
//! governs its JSON value. There are three modes:
//!
//! - **Unbound**: no schema, any value is accepted.
//! - **Static**: one schema for every record.
//! - **Polymorphic**: the schema is chosen by the value of a sibling field
//!   through a [`PolymorphicMap`].
//!
//! [`BindingConfig`] is the serialized form. It is what a migration history
//! records, so every schema in it is a dotted path. `from_config` and
//! `deconstruct` round-trip.

use std::collections::BTreeMap;

use eavs_core::SchemaDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EavError, ResolveError};
use crate::path::SchemaPath;
use crate::polymorphic::{PolymorphicMap, PolymorphicSelector};
use crate::resolver::{SchemaReference, SchemaResolver};

/// Serialized binding: `schema`, or `schema_map` with `schema_key_field`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_map: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_key_field: Option<String>,
}

/// Which schema, if any, governs a stored JSON value.
#[derive(Debug, Clone, Default)]
pub enum SchemaBinding {
    #[default]
    Unbound,
    Static(SchemaReference),
    Polymorphic(PolymorphicMap),
}

impl SchemaBinding {
    /// Bind one schema to every record.
    pub fn fixed(reference: impl Into<SchemaReference>) -> Self {
        SchemaBinding::Static(reference.into())
    }

    /// Select the schema per record through `map`.
    pub fn polymorphic(map: PolymorphicMap) -> Self {
        SchemaBinding::Polymorphic(map)
    }

    /// Build a binding from its serialized form.
    pub fn from_config(config: BindingConfig) -> Result<Self, ResolveError> {
        match (config.schema, config.schema_map, config.schema_key_field) {
            (Some(_), Some(_), _) => Err(ResolveError::InvalidBinding(
                "specify either 'schema' or 'schema_map', not both".into(),
            )),
            (Some(_), None, Some(_)) => Err(ResolveError::InvalidBinding(
                "'schema_key_field' is only meaningful with 'schema_map'".into(),
            )),
            (Some(schema), None, None) => Ok(SchemaBinding::Static(SchemaReference::path(&schema)?)),
            (None, Some(_), None) => Err(ResolveError::InvalidBinding(
                "'schema_key_field' is required when using 'schema_map'".into(),
            )),
            (None, Some(variants), Some(field)) => {
                let mut map = PolymorphicMap::new(field);
                for (value, path) in variants {
                    map.insert(value, SchemaPath::new(path)?);
                }
                Ok(SchemaBinding::Polymorphic(map))
            }
            (None, None, Some(_)) => Err(ResolveError::InvalidBinding(
                "'schema_key_field' is only meaningful with 'schema_map'".into(),
            )),
            (None, None, None) => Ok(SchemaBinding::Unbound),
        }
    }

    /// Serialized form, with every schema rendered as a dotted path.
    ///
    /// Fails if a direct schema handle has no module path.
    pub fn deconstruct(&self) -> Result<BindingConfig, ResolveError> {
        match self {
            SchemaBinding::Unbound => Ok(BindingConfig::default()),
            SchemaBinding::Static(reference) => Ok(BindingConfig {
                schema: Some(reference.to_path()?.to_string()),
                ..BindingConfig::default()
            }),
            SchemaBinding::Polymorphic(map) => {
                let schema_map = map
                    .iter()
                    .map(|(value, reference)| Ok((value.to_string(), reference.to_path()?.to_string())))
                    .collect::<Result<BTreeMap<_, _>, ResolveError>>()?;
                Ok(BindingConfig {
                    schema: None,
                    schema_map: Some(schema_map),
                    schema_key_field: Some(map.discriminator_field().to_string()),
                })
            }
        }
    }

    /// Sibling field supplying the discriminator, in polymorphic mode.
    pub fn discriminator_field(&self) -> Option<&str> {
        match self {
            SchemaBinding::Polymorphic(map) => Some(map.discriminator_field()),
            _ => None,
        }
    }

    /// Validate a stored value.
    ///
    /// Non-object values are left to the host and returned unchanged, as is
    /// anything under an unbound binding. Objects come back cleaned.
    pub fn validate(
        &self,
        value: &Value,
        discriminator: Option<&str>,
        resolver: &SchemaResolver,
    ) -> Result<Value, EavError> {
        let Value::Object(data) = value else {
            return Ok(value.clone());
        };
        let schema = match self {
            SchemaBinding::Unbound => return Ok(value.clone()),
            SchemaBinding::Static(reference) => resolver.resolve(reference)?,
            SchemaBinding::Polymorphic(map) => PolymorphicSelector::new(resolver).select(discriminator, map)?,
        };
        Ok(Value::Object(schema.validate(data)?))
    }

    /// Describe the fieldsets a form renderer should offer.
    pub fn describe(&self, resolver: &SchemaResolver) -> Result<BindingDescriptor, ResolveError> {
        match self {
            SchemaBinding::Unbound => Ok(BindingDescriptor::Unbound),
            SchemaBinding::Static(reference) => Ok(BindingDescriptor::Static {
                fieldset: resolver.resolve(reference)?.describe(),
            }),
            SchemaBinding::Polymorphic(map) => {
                let fieldsets = map
                    .iter()
                    .map(|(key, reference)| {
                        Ok(VariantDescriptor {
                            key: key.to_string(),
                            schema: resolver.resolve(reference)?.describe(),
                        })
                    })
                    .collect::<Result<Vec<_>, ResolveError>>()?;
                Ok(BindingDescriptor::Polymorphic {
                    discriminator_field: map.discriminator_field().to_string(),
                    fieldsets,
                })
            }
        }
    }
}

/// Renderer view of a binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BindingDescriptor {
    /// Raw JSON editing.
    Unbound,
    Static {
        fieldset: SchemaDescriptor,
    },
    /// One fieldset per discriminator value; the renderer shows the one
    /// matching `discriminator_field`.
    Polymorphic {
        discriminator_field: String,
        fieldsets: Vec<VariantDescriptor>,
    },
}

/// Fieldset for one discriminator value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantDescriptor {
    pub key: String,
    #[serde(flatten)]
    pub schema: SchemaDescriptor,
}
