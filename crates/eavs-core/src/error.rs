//! # Error Types: Field-Keyed Validation Errors
//!
//! Two families of errors live here:
//!
//! - [`ValidationError`]: produced when *data* does not conform to a schema.
//!   It is an aggregate keyed by field name, so a caller editing the
//!   underlying data sees every invalid field at once. Every message carries
//!   an [`ErrorKind`] tag so callers can distinguish a missing field from a
//!   bounds violation without parsing text.
//! - [`DefinitionError`]: produced when a *schema* is declared incorrectly
//!   (duplicate attribute, inapplicable constraint, inverted bounds).
//!
//! ## Design
//!
//! - Field-level kinds (`RequiredFieldMissing` through `ChoiceViolation`) are
//!   accumulated across the whole attribute pass.
//! - `UnknownKey`, `CrossField` and `NotAnObject` terminate validation on
//!   their own and are never mixed with field-level kinds.
//! - Errors that do not belong to a single field use [`NON_FIELD_ERRORS`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Key under which errors not attributable to one field are reported.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Classification of a single validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input contained a key the schema does not declare.
    UnknownKey,
    /// A required attribute without a default was absent.
    RequiredFieldMissing,
    /// The raw value is not of a kind the attribute accepts.
    TypeMismatch,
    /// The raw value was of an accepted kind but could not be converted.
    Coercion,
    /// A bounds, length, or digit-count constraint failed.
    ConstraintViolation,
    /// The coerced value is not one of the declared choices.
    ChoiceViolation,
    /// A cross-field rule rejected the cleaned values.
    CrossField,
    /// The input as a whole was not a JSON object.
    NotAnObject,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::UnknownKey => "unknown_key",
            ErrorKind::RequiredFieldMissing => "required",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::Coercion => "coercion",
            ErrorKind::ConstraintViolation => "constraint",
            ErrorKind::ChoiceViolation => "choice",
            ErrorKind::CrossField => "cross_field",
            ErrorKind::NotAnObject => "not_an_object",
        }
    }

    /// Whether errors of this kind are accumulated per attribute.
    pub fn is_field_level(&self) -> bool {
        matches!(
            self,
            ErrorKind::RequiredFieldMissing
                | ErrorKind::TypeMismatch
                | ErrorKind::Coercion
                | ErrorKind::ConstraintViolation
                | ErrorKind::ChoiceViolation
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One human-readable message attached to a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Message suitable for display to an end user.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Aggregate of field-keyed validation failures.
///
/// Serializes as `{"field": [{"kind": "...", "message": "..."}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationError {
    errors: BTreeMap<String, Vec<FieldError>>,
}

impl ValidationError {
    /// Create an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregate holding one message.
    pub fn single(field: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, kind, message);
        err
    }

    /// Convenience for cross-field hooks: one `CrossField` message on `field`.
    pub fn cross_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::single(field, ErrorKind::CrossField, message)
    }

    /// Append a message to `field`.
    pub fn add(&mut self, field: impl Into<String>, kind: ErrorKind, message: impl Into<String>) {
        self.push(field, FieldError::new(kind, message));
    }

    /// Append an already-built error to `field`.
    pub fn push(&mut self, field: impl Into<String>, error: FieldError) {
        self.errors.entry(field.into()).or_default().push(error);
    }

    /// Returns true if no field has an error.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields carrying at least one error.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Names of the failing fields, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Errors recorded for `field` (empty if none).
    pub fn errors_for(&self, field: &str) -> &[FieldError] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `field` has at least one error.
    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Returns true if any field has an error of `kind`.
    pub fn has_kind(&self, kind: ErrorKind) -> bool {
        self.errors.values().flatten().any(|e| e.kind == kind)
    }

    /// Returns true if `field` has an error of `kind`.
    pub fn field_has_kind(&self, field: &str, kind: ErrorKind) -> bool {
        self.errors_for(field).iter().any(|e| e.kind == kind)
    }

    /// Iterate over `(field, errors)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FieldError])> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Field name to plain messages, the shape form renderers expect.
    pub fn message_dict(&self) -> BTreeMap<String, Vec<String>> {
        self.errors
            .iter()
            .map(|(field, errors)| {
                (
                    field.clone(),
                    errors.iter().map(|e| e.message.clone()).collect(),
                )
            })
            .collect()
    }

    /// `Ok(value)` if empty, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, errors) in &self.errors {
            for error in errors {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {error}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// A schema declaration that cannot be turned into a definition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    /// The schema was given an empty name.
    #[error("schema name must not be empty")]
    EmptySchemaName,

    /// The schema name contains a `.`, which would move it into a
    /// different module once qualified.
    #[error("schema name '{name}' must not contain '.'")]
    DottedSchemaName {
        /// Name as declared.
        name: String,
    },

    /// The same attribute name was declared twice in one schema body.
    #[error("schema '{schema}' declares attribute '{attribute}' more than once")]
    DuplicateAttribute {
        /// Schema being defined.
        schema: String,
        /// Offending attribute name.
        attribute: String,
    },

    /// Attribute name is empty or reserved.
    #[error("schema '{schema}' has an invalid attribute name '{attribute}': {reason}")]
    InvalidAttributeName {
        /// Schema being defined.
        schema: String,
        /// Offending attribute name.
        attribute: String,
        /// Why the name is rejected.
        reason: String,
    },

    /// A constraint does not fit the attribute it was declared on.
    #[error("attribute '{attribute}' of schema '{schema}' is misconfigured: {reason}")]
    InvalidConstraint {
        /// Schema being defined.
        schema: String,
        /// Offending attribute name.
        attribute: String,
        /// Description of the misconfiguration.
        reason: String,
    },
}
