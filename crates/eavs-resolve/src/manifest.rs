//! # Schema Manifests
//!
//! Declarative schema definitions loaded into a [`SchemaCatalog`] from YAML
//! or JSON text.
//!
//! ```text
//! Manifest
//! └── modules: module path → schemas
//!     └── TypeName (SchemaSpec)
//!         ├── extends: [dotted paths]
//!         └── attributes: [AttributeSpec]
//! ```
//!
//! ## Loading
//!
//! Every schema in a manifest is built before any is registered, so a
//! manifest either loads completely or leaves the catalog untouched.
//! `extends` entries resolve first against the same manifest, then against
//! exports already in the catalog. Cycles are rejected.
//!
//! Cross-field hooks cannot be declared in a manifest.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use eavs_core::{AttrValue, Attribute, AttributeKind, AttributeType, SchemaDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{Export, SchemaCatalog};
use crate::error::ResolveError;
use crate::path::SchemaPath;

/// Root of a manifest document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub modules: BTreeMap<String, BTreeMap<String, SchemaSpec>>,
}

/// One schema declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSpec {
    /// Dotted paths of parent schemas, most general first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
}

/// One attribute declaration. Constraints that do not apply to `kind` are
/// rejected when the schema is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeSpec {
    pub name: String,
    pub kind: AttributeKind,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_digits: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_places: Option<u32>,
}

fn default_required() -> bool {
    true
}

impl Manifest {
    pub fn from_yaml_str(text: &str) -> Result<Self, ResolveError> {
        serde_yaml::from_str(text).map_err(|e| ResolveError::Manifest(format!("YAML parse error: {e}")))
    }

    pub fn from_json_str(text: &str) -> Result<Self, ResolveError> {
        serde_json::from_str(text).map_err(|e| ResolveError::Manifest(format!("JSON parse error: {e}")))
    }
}

impl AttributeSpec {
    /// Turn the declaration into an [`Attribute`].
    pub fn to_attribute(&self, schema: &SchemaPath) -> Result<Attribute, ResolveError> {
        let literal = |label: &str, value: &Value| {
            AttrValue::try_from(value).map_err(|reason| {
                ResolveError::Manifest(format!(
                    "{schema}: attribute '{}' has an invalid {label}: {reason}",
                    self.name
                ))
            })
        };

        let mut attribute = match self.kind {
            AttributeKind::String => Attribute::string(),
            AttributeKind::Boolean => Attribute::boolean(),
            AttributeKind::Integer => Attribute::integer(),
            AttributeKind::Float => Attribute::float(),
            AttributeKind::Decimal => Attribute::decimal(),
        }
        .required(self.required)
        .help_text(self.help_text.clone());

        if let Some(default) = &self.default {
            let value = literal("default", default)?;
            let fitted = attribute.attribute_type().normalize(&value).ok_or_else(|| {
                ResolveError::Manifest(format!(
                    "{schema}: default {} of attribute '{}' is not a {} value",
                    value.repr(),
                    self.name,
                    self.kind.tag()
                ))
            })?;
            attribute = attribute.default(fitted);
        }
        if let Some(choices) = &self.choices {
            let values = choices
                .iter()
                .map(|c| literal("choice", c))
                .collect::<Result<Vec<_>, _>>()?;
            attribute = attribute.choices(values);
        }
        if let Some(max) = self.max_length {
            attribute = attribute.max_length(max);
        }
        if let Some(digits) = self.max_digits {
            attribute = attribute.max_digits(digits);
        }
        if let Some(places) = self.decimal_places {
            attribute = attribute.decimal_places(places);
        }
        if let Some(bound) = &self.min_value {
            attribute = attribute.min_value(literal("min_value", bound)?);
        }
        if let Some(bound) = &self.max_value {
            attribute = attribute.max_value(literal("max_value", bound)?);
        }
        Ok(attribute)
    }
}

impl SchemaCatalog {
    /// Parse a YAML manifest and register every schema it declares.
    pub fn load_manifest_yaml(&self, text: &str) -> Result<Vec<SchemaPath>, ResolveError> {
        self.load_manifest(&Manifest::from_yaml_str(text)?)
    }

    /// Parse a JSON manifest and register every schema it declares.
    pub fn load_manifest_json(&self, text: &str) -> Result<Vec<SchemaPath>, ResolveError> {
        self.load_manifest(&Manifest::from_json_str(text)?)
    }

    /// Build and register every schema of `manifest`. Returns the
    /// registered paths, sorted.
    pub fn load_manifest(&self, manifest: &Manifest) -> Result<Vec<SchemaPath>, ResolveError> {
        let mut specs: HashMap<SchemaPath, &SchemaSpec> = HashMap::new();
        for (module, schemas) in &manifest.modules {
            for (name, spec) in schemas {
                specs.insert(SchemaPath::from_parts(module, name)?, spec);
            }
        }

        let mut loader = ManifestLoader {
            catalog: self,
            specs: &specs,
            built: HashMap::new(),
            in_progress: HashSet::new(),
        };
        let mut paths: Vec<SchemaPath> = specs.keys().cloned().collect();
        paths.sort();
        for path in &paths {
            loader.build(path)?;
        }

        for (path, schema) in loader.built {
            if self.contains(&path) {
                tracing::warn!(path = %path, "manifest schema replaces an existing catalog export");
            }
            self.insert(
                &path,
                Export::Schema(Arc::new(move || Ok(SchemaDefinition::clone(&schema)))),
            );
        }
        tracing::debug!(schemas = paths.len(), "manifest loaded");
        Ok(paths)
    }
}

struct ManifestLoader<'a> {
    catalog: &'a SchemaCatalog,
    specs: &'a HashMap<SchemaPath, &'a SchemaSpec>,
    built: HashMap<SchemaPath, Arc<SchemaDefinition>>,
    in_progress: HashSet<SchemaPath>,
}

impl ManifestLoader<'_> {
    fn build(&mut self, path: &SchemaPath) -> Result<Arc<SchemaDefinition>, ResolveError> {
        if let Some(schema) = self.built.get(path) {
            return Ok(Arc::clone(schema));
        }
        let specs = self.specs;
        let Some(spec) = specs.get(path).copied() else {
            return self.catalog.load(path).map(Arc::new);
        };
        if !self.in_progress.insert(path.clone()) {
            return Err(ResolveError::InheritanceCycle {
                path: path.to_string(),
            });
        }

        let mut builder = SchemaDefinition::builder(path.type_name()).module(path.module());
        for parent in &spec.extends {
            let parent_path = SchemaPath::new(parent.as_str())?;
            builder = builder.extends(self.build(&parent_path)?);
        }
        for attribute in &spec.attributes {
            builder = builder.attribute(attribute.name.clone(), attribute.to_attribute(path)?);
        }
        let schema = Arc::new(builder.build().map_err(|source| ResolveError::Definition {
            path: path.to_string(),
            source,
        })?);

        self.in_progress.remove(path);
        self.built.insert(path.clone(), Arc::clone(&schema));
        Ok(schema)
    }
}

/// Declaration of `attribute` in manifest form.
///
/// Inverse of [`AttributeSpec::to_attribute`].
pub fn attribute_spec(name: &str, attribute: &Attribute) -> AttributeSpec {
    let render = |value: &AttrValue| attribute.to_json(value);
    let mut spec = AttributeSpec {
        name: name.to_string(),
        kind: attribute.kind(),
        required: attribute.is_required(),
        default: attribute.from_default(),
        help_text: attribute.help().to_string(),
        choices: attribute.allowed_values().map(|c| c.iter().map(render).collect()),
        max_length: None,
        min_value: None,
        max_value: None,
        max_digits: None,
        decimal_places: None,
    };
    match attribute.attribute_type() {
        AttributeType::String { max_length } => spec.max_length = *max_length,
        AttributeType::Boolean => {}
        AttributeType::Integer { min_value, max_value } => {
            spec.min_value = min_value.map(Value::from);
            spec.max_value = max_value.map(Value::from);
        }
        AttributeType::Float { min_value, max_value } => {
            spec.min_value = min_value.map(|v| AttrValue::Float(v).to_json());
            spec.max_value = max_value.map(|v| AttrValue::Float(v).to_json());
        }
        AttributeType::Decimal {
            max_digits,
            decimal_places,
            min_value,
            max_value,
        } => {
            spec.max_digits = *max_digits;
            spec.decimal_places = *decimal_places;
            spec.min_value = min_value.map(|v| Value::String(v.to_string()));
            spec.max_value = max_value.map(|v| Value::String(v.to_string()));
        }
    }
    spec
}

/// Manifest declaration of a built schema. Parents are flattened into the
/// attribute list.
pub fn schema_spec(schema: &SchemaDefinition) -> SchemaSpec {
    SchemaSpec {
        extends: Vec::new(),
        attributes: schema
            .attributes()
            .iter()
            .map(|(name, attribute)| attribute_spec(name, attribute))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::SchemaResolver;
    use eavs_core::ErrorKind;
    use serde_json::json;

    const BILLING: &str = r#"
modules:
  billing.schemas:
    BaseConfig:
      attributes:
        - { name: label, kind: string, max_length: 10 }
        - { name: enabled, kind: boolean, default: false }
    InstallmentConfig:
      extends: [billing.schemas.BaseConfig]
      attributes:
        - { name: label, kind: string, max_length: 5 }
        - name: rate_floor
          kind: decimal
          required: false
          max_digits: 7
          decimal_places: 5
          min_value: "0"
        - { name: period, kind: string, choices: [monthly, weekly] }
"#;

    fn map(value: Value) -> serde_json::Map<String, Value> {
        match value {
            Value::Object(m) => m,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_yaml_manifest_registers_schemas() {
        let catalog = Arc::new(SchemaCatalog::new());
        let paths = catalog.load_manifest_yaml(BILLING).unwrap();
        assert_eq!(
            paths.iter().map(SchemaPath::as_str).collect::<Vec<_>>(),
            vec!["billing.schemas.BaseConfig", "billing.schemas.InstallmentConfig"]
        );

        let resolver = SchemaResolver::new(Arc::clone(&catalog));
        let child = resolver.resolve_str("billing.schemas.InstallmentConfig").unwrap();
        assert_eq!(
            child.attributes().names().collect::<Vec<_>>(),
            vec!["enabled", "label", "rate_floor", "period"]
        );

        let cleaned = child
            .validate(&map(json!({"label": "abc", "rate_floor": "0.065", "period": "monthly"})))
            .unwrap();
        assert_eq!(cleaned["rate_floor"], json!("0.065"));
        assert_eq!(cleaned["enabled"], json!(false));

        let err = child
            .validate(&map(json!({"label": "abcdefg", "period": "monthly"})))
            .unwrap_err();
        assert!(err.field_has_kind("label", ErrorKind::ConstraintViolation));
    }

    #[test]
    fn test_json_manifest() {
        let catalog = SchemaCatalog::new();
        let text = json!({
            "modules": {
                "app": {"Flag": {"attributes": [{"name": "on", "kind": "boolean"}]}}
            }
        })
        .to_string();
        catalog.load_manifest_json(&text).unwrap();
        assert!(catalog.load(&SchemaPath::new("app.Flag").unwrap()).is_ok());
    }

    #[test]
    fn test_extends_existing_catalog_export() {
        let catalog = SchemaCatalog::new();
        catalog
            .register(
                SchemaDefinition::builder("Base")
                    .module("core")
                    .attribute("id", Attribute::integer())
                    .build()
                    .unwrap(),
            )
            .unwrap();
        catalog
            .load_manifest_yaml(
                "modules:\n  app:\n    Child:\n      extends: [core.Base]\n      attributes:\n        - { name: note, kind: string }\n",
            )
            .unwrap();
        let child = catalog.load(&SchemaPath::new("app.Child").unwrap()).unwrap();
        assert_eq!(child.attributes().names().collect::<Vec<_>>(), vec!["id", "note"]);
    }

    #[test]
    fn test_cycle_rejected_and_catalog_untouched() {
        let catalog = SchemaCatalog::new();
        let text = "modules:\n  app:\n    A: { extends: [app.B] }\n    B: { extends: [app.A] }\n    C: {}\n";
        let err = catalog.load_manifest_yaml(text).unwrap_err();
        assert!(matches!(err, ResolveError::InheritanceCycle { .. }), "{err}");
        assert!(catalog.modules().is_empty());
    }

    #[test]
    fn test_invalid_declarations() {
        let catalog = SchemaCatalog::new();

        let misapplied = "modules:\n  app:\n    S:\n      attributes:\n        - { name: f, kind: boolean, max_length: 3 }\n";
        assert!(matches!(
            catalog.load_manifest_yaml(misapplied),
            Err(ResolveError::Definition { .. })
        ));

        let bad_default = "modules:\n  app:\n    S:\n      attributes:\n        - { name: n, kind: integer, default: abc }\n";
        assert!(matches!(catalog.load_manifest_yaml(bad_default), Err(ResolveError::Manifest(_))));

        let unknown_field = "modules:\n  app:\n    S:\n      attributes:\n        - { name: n, kind: integer, maximum: 3 }\n";
        assert!(matches!(catalog.load_manifest_yaml(unknown_field), Err(ResolveError::Manifest(_))));

        let dotted_name = "modules:\n  app:\n    \"x.Y\": {}\n";
        assert!(matches!(
            catalog.load_manifest_yaml(dotted_name),
            Err(ResolveError::InvalidPath { .. })
        ));
        assert!(catalog.modules().is_empty());

        let missing_parent = "modules:\n  app:\n    S: { extends: [other.Base] }\n";
        assert!(matches!(
            catalog.load_manifest_yaml(missing_parent),
            Err(ResolveError::ModuleNotFound { .. })
        ));
    }

    #[test]
    fn test_schema_spec_round_trip() {
        let schema = SchemaDefinition::builder("Rates")
            .module("app")
            .attribute("ceiling", Attribute::decimal().max_digits(7).decimal_places(5).min_value(0))
            .attribute("count", Attribute::integer().optional().max_value(10))
            .attribute("mode", Attribute::string().choices(["a", "b"]).default("a"))
            .build()
            .unwrap();

        let manifest = Manifest {
            modules: BTreeMap::from([(
                "copy".to_string(),
                BTreeMap::from([("Rates".to_string(), schema_spec(&schema))]),
            )]),
        };
        let yaml = serde_yaml::to_string(&manifest).unwrap();
        let catalog = SchemaCatalog::new();
        catalog.load_manifest_yaml(&yaml).unwrap();

        let copy = catalog.load(&SchemaPath::new("copy.Rates").unwrap()).unwrap();
        for (name, attribute) in schema.attributes().iter() {
            assert_eq!(copy.attribute(name), Some(attribute), "attribute {name} differs");
        }
    }
}
