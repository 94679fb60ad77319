//! # Validation Pipeline
//!
//! Entry points on [`SchemaDefinition`] that take raw JSON input:
//!
//! - [`validate`](SchemaDefinition::validate) returns the cleaned object in
//!   its stored JSON form, ready to persist.
//! - [`clean`](SchemaDefinition::clean) stops before rendering and returns
//!   the typed values.
//! - [`validate_value`](SchemaDefinition::validate_value) accepts any JSON
//!   value; `null` is an empty object.
//! - [`apply_defaults`](SchemaDefinition::apply_defaults) and
//!   [`decode`](SchemaDefinition::decode) work on already stored data and
//!   never fail.
//!
//! ## Order of checks
//!
//! 1. Unknown keys. Every unknown key is reported and nothing else runs.
//! 2. Each attribute in resolved order. Errors accumulate across fields.
//! 3. The cross-field hook, only when step 2 was clean.
//!
//! An explicit `null` for an attribute counts as absent.

use serde_json::{Map, Value};

use crate::error::{ErrorKind, ValidationError, NON_FIELD_ERRORS};
use crate::schema::SchemaDefinition;
use crate::value::{AttrValue, CleanedData};

impl SchemaDefinition {
    /// Validate `data` and return it cleaned, in stored form.
    pub fn validate(&self, data: &Map<String, Value>) -> Result<Map<String, Value>, ValidationError> {
        let cleaned = self.clean(data)?;
        Ok(self.render(&cleaned))
    }

    /// Like [`validate`](Self::validate), for input that may not be an object.
    pub fn validate_value(&self, data: &Value) -> Result<Map<String, Value>, ValidationError> {
        match data {
            Value::Null => self.validate(&Map::new()),
            Value::Object(map) => self.validate(map),
            _ => Err(ValidationError::single(
                NON_FIELD_ERRORS,
                ErrorKind::NotAnObject,
                "Data must be a JSON object.",
            )),
        }
    }

    /// Validate `data` and return the typed values without rendering.
    pub fn clean(&self, data: &Map<String, Value>) -> Result<CleanedData, ValidationError> {
        self.reject_unknown_keys(data)?;

        let mut errors = ValidationError::new();
        let mut cleaned = CleanedData::new();
        for (name, attribute) in self.attributes().iter() {
            match data.get(name).filter(|v| !v.is_null()) {
                Some(raw) => match attribute.clean(name, raw) {
                    Ok(value) => cleaned.insert(name, value),
                    Err(field_errors) => {
                        for error in field_errors {
                            errors.push(name, error);
                        }
                    }
                },
                None => match attribute.typed_default() {
                    Some(default) => cleaned.insert(name, default),
                    None if attribute.is_required() => errors.add(
                        name,
                        ErrorKind::RequiredFieldMissing,
                        format!("{name} is required."),
                    ),
                    None => {}
                },
            }
        }

        if !errors.is_empty() {
            tracing::debug!(schema = %self.name(), fields = errors.len(), "attribute validation failed");
            return Err(errors);
        }

        if let Some(hook) = self.cross_hook() {
            hook(&cleaned).map_err(|err| {
                tracing::debug!(schema = %self.name(), fields = err.len(), "cross-field validation failed");
                err
            })?;
        }

        Ok(cleaned)
    }

    /// Stored JSON form of typed values. Keys follow attribute order.
    pub fn render(&self, cleaned: &CleanedData) -> Map<String, Value> {
        self.attributes()
            .iter()
            .filter_map(|(name, attribute)| {
                cleaned
                    .get(name)
                    .map(|value| (name.to_string(), attribute.to_json(value)))
            })
            .collect()
    }

    /// Fill absent keys that have a default. Present keys, including
    /// unknown ones, are kept as given. Nothing is validated.
    pub fn apply_defaults(&self, data: &Map<String, Value>) -> Map<String, Value> {
        let mut result = data.clone();
        for (name, attribute) in self.attributes().iter() {
            if result.contains_key(name) {
                continue;
            }
            if let Some(default) = attribute.from_default() {
                result.insert(name.to_string(), default);
            }
        }
        result
    }

    /// Read stored data back into typed values.
    ///
    /// Unreadable or missing values fall back to the attribute default;
    /// unknown keys are ignored.
    pub fn decode(&self, stored: &Map<String, Value>) -> CleanedData {
        self.attributes()
            .iter()
            .filter_map(|(name, attribute)| {
                let value: Option<AttrValue> = match stored.get(name) {
                    Some(raw) => attribute.from_json(raw),
                    None => attribute.typed_default(),
                };
                value.map(|v| (name, v))
            })
            .collect()
    }

    fn reject_unknown_keys(&self, data: &Map<String, Value>) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        for key in data.keys().filter(|k| !self.attributes().contains(k)) {
            errors.add(key.as_str(), ErrorKind::UnknownKey, format!("Unknown key: {key}."));
        }
        if !errors.is_empty() {
            tracing::debug!(schema = %self.name(), fields = errors.len(), "unknown keys rejected");
        }
        errors.into_result(())
    }
}
