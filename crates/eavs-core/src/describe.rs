//! # Introspection Descriptors
//!
//! Serializable, read-only views of a schema for form renderers. A
//! renderer walks [`SchemaDescriptor::attributes`] in order and picks an
//! input control from each [`ControlHint`].

use serde::Serialize;
use serde_json::Value;

use crate::attribute::{Attribute, AttributeKind};
use crate::schema::SchemaDefinition;
use crate::value::AttrValue;

/// Suggested input control for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum ControlHint {
    Checkbox,
    /// Drop-down of the declared choices.
    Select {
        options: Vec<String>,
        /// Whether an empty option precedes the choices.
        allow_empty: bool,
    },
    /// Numeric input. `step` is `"1"` for integers, `"any"` otherwise.
    Number { step: String },
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
}

impl ControlHint {
    fn for_attribute(attribute: &Attribute) -> Self {
        match (attribute.kind(), attribute.allowed_values()) {
            (AttributeKind::Boolean, _) => ControlHint::Checkbox,
            (AttributeKind::String, Some(choices)) => ControlHint::Select {
                options: choices.iter().map(AttrValue::to_string).collect(),
                allow_empty: !attribute.is_required(),
            },
            (AttributeKind::Integer, _) => ControlHint::Number { step: "1".into() },
            (AttributeKind::Float | AttributeKind::Decimal, _) => ControlHint::Number { step: "any".into() },
            (AttributeKind::String, None) => ControlHint::Text {
                max_length: attribute.length_limit(),
            },
        }
    }
}

/// Everything a renderer needs to know about one attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDescriptor {
    pub name: String,
    /// Human label derived from the name.
    pub label: String,
    pub kind: AttributeKind,
    /// JSON type the user is asked to supply.
    pub json_type: &'static str,
    pub required: bool,
    /// Default in stored form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub help_text: String,
    /// Choices in stored form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,
    #[serde(flatten)]
    pub control: ControlHint,
}

/// Ordered attribute descriptors of one schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescriptor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualified_name: Option<String>,
    pub attributes: Vec<AttributeDescriptor>,
}

impl SchemaDefinition {
    /// Describe every attribute in resolved order.
    pub fn describe(&self) -> SchemaDescriptor {
        let attributes = self
            .attributes()
            .iter()
            .map(|(name, attribute)| AttributeDescriptor {
                name: name.to_string(),
                label: label_for(name),
                kind: attribute.kind(),
                json_type: attribute.kind().json_type(),
                required: attribute.is_required(),
                default: attribute.from_default(),
                help_text: attribute.help().to_string(),
                choices: attribute
                    .allowed_values()
                    .map(|choices| choices.iter().map(|c| attribute.to_json(c)).collect()),
                control: ControlHint::for_attribute(attribute),
            })
            .collect();

        SchemaDescriptor {
            name: self.name().to_string(),
            qualified_name: self.qualified_name(),
            attributes,
        }
    }
}

/// Display label for an attribute name: `rate_floor` becomes `Rate Floor`.
pub fn label_for(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    let mut after_letter = false;
    for ch in name.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if after_letter {
                label.extend(ch.to_lowercase());
            } else {
                label.extend(ch.to_uppercase());
            }
            after_letter = true;
        } else {
            label.push(ch);
            after_letter = false;
        }
    }
    label
}
