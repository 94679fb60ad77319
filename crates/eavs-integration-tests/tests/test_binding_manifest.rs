//! # Storage Bindings over Manifest Catalogs
//!
//! A catalog populated from a YAML manifest, a binding configured from its
//! serialized form, and stored values validated and described through it.

use std::sync::Arc;

use eavs_core::{ErrorKind, NON_FIELD_ERRORS};
use eavs_resolve::{
    BindingConfig, EavError, ResolveError, SchemaBinding, SchemaCatalog, SchemaResolver,
};
use serde_json::json;

const LOANS: &str = r#"
modules:
  lending.schemas:
    BaseTerms:
      attributes:
        - name: currency
          kind: string
          max_length: 3
          default: USD
          help_text: ISO 4217 code
    FixedTerms:
      extends: [lending.schemas.BaseTerms]
      attributes:
        - { name: rate, kind: decimal, max_digits: 7, decimal_places: 5, min_value: "0" }
    VariableTerms:
      extends: [lending.schemas.BaseTerms]
      attributes:
        - { name: index, kind: string, choices: [SOFR, EURIBOR] }
        - { name: spread_bps, kind: integer, min_value: 0, max_value: 1000 }
        - { name: rate_floor, kind: decimal, required: false, decimal_places: 5 }
"#;

fn resolver() -> SchemaResolver {
    let catalog = SchemaCatalog::new();
    catalog.load_manifest_yaml(LOANS).expect("manifest must load");
    SchemaResolver::new(Arc::new(catalog))
}

fn binding() -> SchemaBinding {
    let config: BindingConfig = serde_json::from_value(json!({
        "schema_map": {
            "fixed": "lending.schemas.FixedTerms",
            "variable": "lending.schemas.VariableTerms",
        },
        "schema_key_field": "rate_type",
    }))
    .unwrap();
    SchemaBinding::from_config(config).unwrap()
}

#[test]
fn polymorphic_binding_validates_each_variant() {
    let resolver = resolver();
    let binding = binding();

    let fixed = binding
        .validate(&json!({"rate": "0.04250"}), Some("fixed"), &resolver)
        .unwrap();
    assert_eq!(fixed, json!({"currency": "USD", "rate": "0.04250"}));

    let variable = binding
        .validate(
            &json!({"currency": "EUR", "index": "EURIBOR", "spread_bps": 125}),
            Some("variable"),
            &resolver,
        )
        .unwrap();
    assert_eq!(variable["spread_bps"], json!(125));
    assert!(variable.get("rate_floor").is_none());
}

#[test]
fn polymorphic_binding_reports_field_errors() {
    let resolver = resolver();
    let err = binding()
        .validate(
            &json!({"currency": "EURO", "index": "LIBOR", "spread_bps": true}),
            Some("variable"),
            &resolver,
        )
        .unwrap_err();

    let validation = err.validation().expect("expected data errors");
    assert!(validation.field_has_kind("currency", ErrorKind::ConstraintViolation));
    assert!(validation.field_has_kind("index", ErrorKind::ChoiceViolation));
    assert!(validation.field_has_kind("spread_bps", ErrorKind::TypeMismatch));
}

#[test]
fn missing_discriminator_is_an_error() {
    let err = binding()
        .validate(&json!({"rate": "0.01"}), None, &resolver())
        .unwrap_err();
    assert!(matches!(
        err,
        EavError::Resolve(ResolveError::UnknownDiscriminator { value: None, .. })
    ));
}

#[test]
fn static_binding_to_unknown_path_fails_on_use() {
    let config = BindingConfig {
        schema: Some("lending.schemas.Missing".into()),
        ..BindingConfig::default()
    };
    let binding = SchemaBinding::from_config(config).unwrap();
    let err = binding.validate(&json!({}), None, &resolver()).unwrap_err();
    assert!(matches!(
        err,
        EavError::Resolve(ResolveError::MissingExport { .. })
    ));
}

#[test]
fn non_object_envelope_is_rejected_by_schema_not_binding() {
    let resolver = resolver();
    let schema = resolver.resolve_str("lending.schemas.FixedTerms").unwrap();
    let err = schema.validate_value(&json!("0.04")).unwrap_err();
    assert!(err.field_has_kind(NON_FIELD_ERRORS, ErrorKind::NotAnObject));

    let passthrough = binding()
        .validate(&json!("0.04"), Some("fixed"), &resolver)
        .unwrap();
    assert_eq!(passthrough, json!("0.04"));
}

#[test]
fn binding_round_trips_through_yaml_config() {
    let binding = binding();
    let config = binding.deconstruct().unwrap();
    let restored = SchemaBinding::from_config(config.clone()).unwrap();
    assert_eq!(restored.deconstruct().unwrap(), config);
    assert_eq!(
        serde_json::to_value(&config).unwrap(),
        json!({
            "schema_map": {
                "fixed": "lending.schemas.FixedTerms",
                "variable": "lending.schemas.VariableTerms",
            },
            "schema_key_field": "rate_type",
        })
    );
}

#[test]
fn describe_lists_inherited_attributes_first() {
    let descriptor = binding().describe(&resolver()).unwrap();
    let json = serde_json::to_value(&descriptor).unwrap();

    let variable = &json["fieldsets"][1];
    assert_eq!(variable["key"], "variable");
    let names: Vec<_> = variable["attributes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["currency", "index", "spread_bps", "rate_floor"]);

    let currency = &variable["attributes"][0];
    assert_eq!(currency["label"], "Currency");
    assert_eq!(currency["default"], "USD");
    assert_eq!(currency["help_text"], "ISO 4217 code");
    assert_eq!(currency["control"], "text");
    assert_eq!(currency["max_length"], 3);
}
