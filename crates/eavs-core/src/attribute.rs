//! # Attribute Types
//!
//! An [`Attribute`] is one declared key of a schema: its scalar kind with
//! kind-specific constraints ([`AttributeType`]), plus the options every
//! kind shares (`required`, `default`, `help_text`, `choices`).
//!
//! ## Pipeline
//!
//! Cleaning a raw JSON value runs four stages, stopping at the first hard
//! failure for that field:
//!
//! 1. `check_type`: is the raw value of an accepted kind at all? Booleans
//!    are never integers and integers are never booleans.
//! 2. `coerce`: convert to the canonical typed value ([`AttrValue`]).
//!    Failures here are coercion errors, not constraint errors.
//! 3. `validate_constraints`: bounds, length, digit counts. May yield more
//!    than one error.
//! 4. `choices`: compared against the coerced value, last.
//!
//! `to_json` renders the stored representation. Decimals are stored as text
//! so no precision is lost to binary floating point.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorKind, FieldError};
use crate::value::AttrValue;

/// Tag identifying the scalar kind of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// UTF-8 text.
    String,
    /// Strict boolean.
    Boolean,
    /// Whole number.
    Integer,
    /// Whole or fractional number, stored as a float.
    Float,
    /// Fixed-point decimal, stored as text.
    Decimal,
}

impl AttributeKind {
    /// Tag used in descriptors and manifests.
    pub fn tag(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Boolean => "boolean",
            AttributeKind::Integer => "integer",
            AttributeKind::Float => "float",
            AttributeKind::Decimal => "decimal",
        }
    }

    /// The JSON type a user is asked to supply.
    pub fn json_type(&self) -> &'static str {
        match self {
            AttributeKind::String => "string",
            AttributeKind::Boolean => "boolean",
            AttributeKind::Integer => "integer",
            AttributeKind::Float => "number",
            AttributeKind::Decimal => "decimal",
        }
    }

    fn with_article(&self) -> &'static str {
        match self {
            AttributeKind::Integer => "an integer",
            AttributeKind::String => "a string",
            AttributeKind::Boolean => "a boolean",
            AttributeKind::Float => "a number",
            AttributeKind::Decimal => "a decimal",
        }
    }
}

/// Scalar kind of an attribute together with its kind-specific constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String {
        /// Maximum length in characters.
        max_length: Option<usize>,
    },
    Boolean,
    Integer {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
    Float {
        min_value: Option<f64>,
        max_value: Option<f64>,
    },
    Decimal {
        /// Maximum total number of significant digits.
        max_digits: Option<u32>,
        /// Maximum number of digits after the decimal point.
        decimal_places: Option<u32>,
        min_value: Option<Decimal>,
        max_value: Option<Decimal>,
    },
}

impl AttributeType {
    /// The kind tag of this type.
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeType::String { .. } => AttributeKind::String,
            AttributeType::Boolean => AttributeKind::Boolean,
            AttributeType::Integer { .. } => AttributeKind::Integer,
            AttributeType::Float { .. } => AttributeKind::Float,
            AttributeType::Decimal { .. } => AttributeKind::Decimal,
        }
    }

    /// Whether `value` is of a kind this type accepts before coercion.
    pub fn check_type(&self, value: &Value) -> bool {
        match self {
            AttributeType::String { .. } => value.is_string(),
            AttributeType::Boolean => value.is_boolean(),
            AttributeType::Integer { .. } => match value {
                Value::Number(n) => n.is_i64() || n.is_u64(),
                _ => false,
            },
            AttributeType::Float { .. } => value.is_number(),
            AttributeType::Decimal { .. } => value.is_string() || value.is_number(),
        }
    }

    /// Convert an accepted raw value to its typed form.
    ///
    /// Only meaningful after [`check_type`](Self::check_type) returned true.
    pub fn coerce(&self, name: &str, value: &Value) -> Result<AttrValue, FieldError> {
        let kind = self.kind();
        let mismatch = || type_mismatch(name, kind);
        match self {
            AttributeType::String { .. } => value
                .as_str()
                .map(|s| AttrValue::String(s.to_string()))
                .ok_or_else(mismatch),
            AttributeType::Boolean => value.as_bool().map(AttrValue::Boolean).ok_or_else(mismatch),
            AttributeType::Integer { .. } => match value {
                Value::Number(n) => n.as_i64().map(AttrValue::Integer).ok_or_else(|| {
                    FieldError::new(
                        ErrorKind::Coercion,
                        format!("{name} is out of range for a 64-bit integer."),
                    )
                }),
                _ => Err(mismatch()),
            },
            AttributeType::Float { .. } => value.as_f64().map(AttrValue::Float).ok_or_else(mismatch),
            AttributeType::Decimal { .. } => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return Err(mismatch()),
                };
                parse_decimal(&text).map(AttrValue::Decimal).ok_or_else(|| {
                    FieldError::new(
                        ErrorKind::Coercion,
                        format!("{name} must be a valid decimal."),
                    )
                })
            }
        }
    }

    /// Check kind-specific constraints against a coerced value.
    pub fn validate_constraints(&self, name: &str, value: &AttrValue) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let mut violation = |message: String| {
            errors.push(FieldError::new(ErrorKind::ConstraintViolation, message));
        };

        match (self, value) {
            (AttributeType::String { max_length: Some(max) }, AttrValue::String(s)) => {
                if s.chars().count() > *max {
                    violation(format!("{name} must be at most {max} characters."));
                }
            }
            (AttributeType::Integer { min_value, max_value }, AttrValue::Integer(i)) => {
                if let Some(min) = min_value.filter(|min| i < min) {
                    violation(format!("{name} must be >= {min}."));
                }
                if let Some(max) = max_value.filter(|max| i > max) {
                    violation(format!("{name} must be <= {max}."));
                }
            }
            (AttributeType::Float { min_value, max_value }, AttrValue::Float(x)) => {
                if let Some(min) = min_value.filter(|min| x < min) {
                    violation(format!("{name} must be >= {min}."));
                }
                if let Some(max) = max_value.filter(|max| x > max) {
                    violation(format!("{name} must be <= {max}."));
                }
            }
            (
                AttributeType::Decimal {
                    max_digits,
                    decimal_places,
                    min_value,
                    max_value,
                },
                AttrValue::Decimal(d),
            ) => {
                if let Some(min) = min_value.filter(|min| d < min) {
                    violation(format!("{name} must be >= {min}."));
                }
                if let Some(max) = max_value.filter(|max| d > max) {
                    violation(format!("{name} must be <= {max}."));
                }

                let digits = DigitCount::of(d);
                let mut too_many_digits = false;
                if let Some(max) = max_digits.filter(|max| digits.total > *max) {
                    too_many_digits = true;
                    violation(format!("{name} must have at most {max} digits in total."));
                }
                if let Some(places) = decimal_places.filter(|places| digits.fractional > *places) {
                    violation(format!("{name} must have at most {places} decimal places."));
                }
                if let (Some(max), Some(places), false) = (max_digits, decimal_places, too_many_digits) {
                    let whole_allowed = max.saturating_sub(*places);
                    if digits.whole() > whole_allowed {
                        violation(format!(
                            "{name} must have at most {whole_allowed} digits before the decimal point."
                        ));
                    }
                }
            }
            _ => {}
        }
        errors
    }

    /// Render a typed value in its stored JSON form.
    ///
    /// Values of a neighbouring numeric kind (e.g. an integer default on a
    /// decimal attribute) are converted into this type's representation.
    pub fn to_json(&self, value: &AttrValue) -> Value {
        match (self, value) {
            (AttributeType::Float { .. }, AttrValue::Integer(i)) => AttrValue::Float(*i as f64).to_json(),
            (AttributeType::Decimal { .. }, other) => match to_decimal(other) {
                Some(d) => Value::String(d.to_string()),
                None => other.to_json(),
            },
            (_, other) => other.to_json(),
        }
    }

    /// Fit a declared literal (bound or choice) to this type's value kind.
    pub fn normalize(&self, value: &AttrValue) -> Option<AttrValue> {
        match (self.kind(), value) {
            (AttributeKind::String, AttrValue::String(_))
            | (AttributeKind::Boolean, AttrValue::Boolean(_))
            | (AttributeKind::Integer, AttrValue::Integer(_))
            | (AttributeKind::Float, AttrValue::Float(_)) => Some(value.clone()),
            (AttributeKind::Float, AttrValue::Integer(i)) => Some(AttrValue::Float(*i as f64)),
            (AttributeKind::Decimal, other) => to_decimal(other).map(AttrValue::Decimal),
            _ => None,
        }
    }
}

/// Digit counts of a decimal, measured the way a fixed-point column would.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DigitCount {
    total: u32,
    fractional: u32,
}

impl DigitCount {
    fn of(value: &Decimal) -> Self {
        let mut mantissa = value.mantissa().unsigned_abs();
        let mut significant = 1;
        while mantissa >= 10 {
            mantissa /= 10;
            significant += 1;
        }
        let fractional = value.scale();
        // 0.005 has one significant digit but needs three places.
        Self {
            total: significant.max(fractional),
            fractional,
        }
    }

    fn whole(&self) -> u32 {
        self.total - self.fractional
    }
}

/// Parse decimal text, accepting surrounding whitespace and exponents.
///
/// Returns `None` rather than rounding when the text has more precision
/// than a 96-bit decimal can hold.
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match text.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let mantissa = Decimal::from_str_exact(mantissa).ok()?;
            shift_exact(mantissa, exponent.parse().ok()?)
        }
        None => Decimal::from_str_exact(text).ok(),
    }
}

/// Multiply by `10^exponent` without rounding.
fn shift_exact(mut value: Decimal, exponent: i32) -> Option<Decimal> {
    if value.is_zero() {
        return Some(Decimal::ZERO);
    }
    let scale = value.scale();
    if exponent <= 0 {
        let scale = scale.checked_add(exponent.unsigned_abs())?;
        value.set_scale(scale).ok()?;
        return Some(value);
    }
    let exponent = exponent.unsigned_abs();
    if exponent <= scale {
        value.set_scale(scale - exponent).ok()?;
        return Some(value);
    }
    value.set_scale(0).ok()?;
    for _ in 0..exponent - scale {
        value = value.checked_mul(Decimal::TEN)?;
    }
    Some(value)
}

fn to_decimal(value: &AttrValue) -> Option<Decimal> {
    match value {
        AttrValue::Decimal(d) => Some(*d),
        AttrValue::Integer(i) => Some(Decimal::from(*i)),
        AttrValue::Float(f) => parse_decimal(&f.to_string()),
        AttrValue::String(s) => parse_decimal(s),
        AttrValue::Boolean(_) => None,
    }
}

fn type_mismatch(name: &str, kind: AttributeKind) -> FieldError {
    FieldError::new(
        ErrorKind::TypeMismatch,
        format!("{name} must be {}.", kind.with_article()),
    )
}

/// A declared attribute: type, constraints, and shared options.
///
/// Built with kind constructors and chained setters:
///
/// ```
/// use eavs_core::Attribute;
///
/// let rate = Attribute::decimal()
///     .max_digits(7)
///     .decimal_places(5)
///     .optional()
///     .help_text("Lower bound of the variable rate");
/// ```
///
/// Setters that do not apply to the attribute's kind are recorded and
/// reported when the owning schema is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    ty: AttributeType,
    required: bool,
    default: Option<AttrValue>,
    help_text: String,
    choices: Option<Vec<AttrValue>>,
    misconfigured: Vec<String>,
}

impl Attribute {
    /// Attribute of the given type with default options.
    pub fn new(ty: AttributeType) -> Self {
        Self {
            ty,
            required: true,
            default: None,
            help_text: String::new(),
            choices: None,
            misconfigured: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(AttributeType::String { max_length: None })
    }

    pub fn boolean() -> Self {
        Self::new(AttributeType::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(AttributeType::Integer {
            min_value: None,
            max_value: None,
        })
    }

    pub fn float() -> Self {
        Self::new(AttributeType::Float {
            min_value: None,
            max_value: None,
        })
    }

    pub fn decimal() -> Self {
        Self::new(AttributeType::Decimal {
            max_digits: None,
            decimal_places: None,
            min_value: None,
            max_value: None,
        })
    }

    /// Set whether the attribute must be present.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Shorthand for `required(false)`.
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Value substituted when the attribute is absent.
    ///
    /// Must fit the attribute's kind; bounds and choices are not checked.
    pub fn default(mut self, value: impl Into<AttrValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help_text(mut self, text: impl Into<String>) -> Self {
        self.help_text = text.into();
        self
    }

    /// Restrict the coerced value to one of `choices`.
    pub fn choices<I, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<AttrValue>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Maximum length in characters (string attributes).
    pub fn max_length(mut self, max: usize) -> Self {
        match &mut self.ty {
            AttributeType::String { max_length } => *max_length = Some(max),
            other => self
                .misconfigured
                .push(format!("max_length does not apply to {} attributes", other.kind().tag())),
        }
        self
    }

    /// Maximum total digits (decimal attributes).
    pub fn max_digits(mut self, digits: u32) -> Self {
        match &mut self.ty {
            AttributeType::Decimal { max_digits, .. } => *max_digits = Some(digits),
            other => self
                .misconfigured
                .push(format!("max_digits does not apply to {} attributes", other.kind().tag())),
        }
        self
    }

    /// Maximum digits after the decimal point (decimal attributes).
    pub fn decimal_places(mut self, places: u32) -> Self {
        match &mut self.ty {
            AttributeType::Decimal { decimal_places, .. } => *decimal_places = Some(places),
            other => self.misconfigured.push(format!(
                "decimal_places does not apply to {} attributes",
                other.kind().tag()
            )),
        }
        self
    }

    /// Inclusive lower bound (numeric attributes).
    pub fn min_value(self, bound: impl Into<AttrValue>) -> Self {
        self.bound("min_value", bound.into(), true)
    }

    /// Inclusive upper bound (numeric attributes).
    pub fn max_value(self, bound: impl Into<AttrValue>) -> Self {
        self.bound("max_value", bound.into(), false)
    }

    fn bound(mut self, label: &str, bound: AttrValue, lower: bool) -> Self {
        let kind = self.ty.kind();
        let normalized = self.ty.normalize(&bound);
        match (&mut self.ty, normalized) {
            (AttributeType::Integer { min_value, max_value }, Some(AttrValue::Integer(i))) => {
                *(if lower { min_value } else { max_value }) = Some(i);
            }
            (AttributeType::Float { min_value, max_value }, Some(AttrValue::Float(x))) => {
                *(if lower { min_value } else { max_value }) = Some(x);
            }
            (AttributeType::Decimal { min_value, max_value, .. }, Some(AttrValue::Decimal(d))) => {
                *(if lower { min_value } else { max_value }) = Some(d);
            }
            (AttributeType::String { .. } | AttributeType::Boolean, _) => self
                .misconfigured
                .push(format!("{label} does not apply to {} attributes", kind.tag())),
            _ => self.misconfigured.push(format!(
                "{label} {} is not a valid {} bound",
                bound.repr(),
                kind.tag()
            )),
        }
        self
    }

    /// Check the declaration is coherent and fit choices to the kind.
    pub(crate) fn finalize(mut self) -> Result<Self, String> {
        if !self.misconfigured.is_empty() {
            return Err(self.misconfigured.join("; "));
        }

        let inverted = match &self.ty {
            AttributeType::Integer {
                min_value: Some(min),
                max_value: Some(max),
            } => min > max,
            AttributeType::Float {
                min_value: Some(min),
                max_value: Some(max),
            } => min > max,
            AttributeType::Decimal {
                min_value: Some(min),
                max_value: Some(max),
                ..
            } => min > max,
            _ => false,
        };
        if inverted {
            return Err("min_value is greater than max_value".into());
        }

        if let AttributeType::Decimal {
            max_digits: Some(digits),
            decimal_places: Some(places),
            ..
        } = &self.ty
        {
            if places > digits {
                return Err(format!(
                    "decimal_places ({places}) exceeds max_digits ({digits})"
                ));
            }
        }

        if let Some(default) = self.default.take() {
            let fitted = self.ty.normalize(&default).ok_or_else(|| {
                format!(
                    "default {} is not a valid {} value",
                    default.repr(),
                    self.ty.kind().tag()
                )
            })?;
            self.default = Some(fitted);
        }

        if let Some(choices) = self.choices.take() {
            let mut fitted = Vec::with_capacity(choices.len());
            for choice in &choices {
                let value = self.ty.normalize(choice).ok_or_else(|| {
                    format!(
                        "choice {} is not a valid {} value",
                        choice.repr(),
                        self.ty.kind().tag()
                    )
                })?;
                fitted.push(value);
            }
            self.choices = Some(fitted);
        }

        Ok(self)
    }

    pub fn kind(&self) -> AttributeKind {
        self.ty.kind()
    }

    pub fn attribute_type(&self) -> &AttributeType {
        &self.ty
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&AttrValue> {
        self.default.as_ref()
    }

    /// The default fitted to this attribute's value kind.
    pub fn typed_default(&self) -> Option<AttrValue> {
        self.default
            .as_ref()
            .map(|d| self.ty.normalize(d).unwrap_or_else(|| d.clone()))
    }

    pub fn help(&self) -> &str {
        &self.help_text
    }

    pub fn allowed_values(&self) -> Option<&[AttrValue]> {
        self.choices.as_deref()
    }

    /// Declared `max_length`, for string attributes.
    pub fn length_limit(&self) -> Option<usize> {
        match &self.ty {
            AttributeType::String { max_length } => *max_length,
            _ => None,
        }
    }

    /// Run the full per-field pipeline on a present raw value.
    pub fn clean(&self, name: &str, raw: &Value) -> Result<AttrValue, Vec<FieldError>> {
        if !self.ty.check_type(raw) {
            return Err(vec![type_mismatch(name, self.kind())]);
        }
        let value = self.ty.coerce(name, raw).map_err(|e| vec![e])?;

        let mut errors = self.ty.validate_constraints(name, &value);
        if let Some(choices) = &self.choices {
            if !choices.contains(&value) {
                let allowed = choices.iter().map(AttrValue::repr).collect::<Vec<_>>().join(", ");
                errors.push(FieldError::new(
                    ErrorKind::ChoiceViolation,
                    format!("{name} must be one of: {allowed}."),
                ));
            }
        }

        if errors.is_empty() {
            Ok(value)
        } else {
            Err(errors)
        }
    }

    /// Stored JSON form of a typed value.
    pub fn to_json(&self, value: &AttrValue) -> Value {
        self.ty.to_json(value)
    }

    /// Stored JSON form of the default, if one is declared.
    pub fn from_default(&self) -> Option<Value> {
        self.default.as_ref().map(|d| self.ty.to_json(d))
    }

    /// Read a stored JSON value back into typed form.
    ///
    /// Lenient: `null` or unreadable values fall back to the default.
    pub fn from_json(&self, stored: &Value) -> Option<AttrValue> {
        if stored.is_null() || !self.ty.check_type(stored) {
            return self.typed_default();
        }
        self.ty
            .coerce("value", stored)
            .ok()
            .or_else(|| self.typed_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kinds(result: Result<AttrValue, Vec<FieldError>>) -> Vec<ErrorKind> {
        result.unwrap_err().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_string_accepts_text_and_checks_length() {
        let attr = Attribute::string().max_length(5).finalize().unwrap();
        assert_eq!(attr.clean("code", &json!("abcde")), Ok(AttrValue::from("abcde")));

        let errors = attr.clean("code", &json!("abcdef")).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::ConstraintViolation);
        assert!(errors[0].message.contains("at most 5"));
    }

    #[test]
    fn test_string_length_counts_characters() {
        let attr = Attribute::string().max_length(3).finalize().unwrap();
        assert!(attr.clean("s", &json!("äöü")).is_ok());
    }

    #[test]
    fn test_string_rejects_number() {
        let attr = Attribute::string();
        let errors = attr.clean("name", &json!(42)).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(errors[0].message, "name must be a string.");
    }

    #[test]
    fn test_boolean_is_strict() {
        let attr = Attribute::boolean();
        assert_eq!(attr.clean("flag", &json!(false)), Ok(AttrValue::Boolean(false)));
        assert_eq!(kinds(attr.clean("flag", &json!(0))), vec![ErrorKind::TypeMismatch]);
        assert_eq!(kinds(attr.clean("flag", &json!(1))), vec![ErrorKind::TypeMismatch]);
        assert_eq!(kinds(attr.clean("flag", &json!("true"))), vec![ErrorKind::TypeMismatch]);
    }

    #[test]
    fn test_integer_rejects_bool_and_float() {
        let attr = Attribute::integer();
        assert_eq!(attr.clean("count", &json!(42)), Ok(AttrValue::Integer(42)));

        let errors = attr.clean("count", &json!(true)).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(errors[0].message, "count must be an integer.");
        assert_eq!(kinds(attr.clean("count", &json!(3.14))), vec![ErrorKind::TypeMismatch]);
    }

    #[test]
    fn test_integer_out_of_range_is_coercion_error() {
        let attr = Attribute::integer();
        assert_eq!(kinds(attr.clean("n", &json!(u64::MAX))), vec![ErrorKind::Coercion]);
    }

    #[test]
    fn test_integer_bounds() {
        let attr = Attribute::integer().min_value(0).max_value(100).finalize().unwrap();
        assert!(attr.clean("count", &json!(0)).is_ok());
        assert!(attr.clean("count", &json!(100)).is_ok());
        assert!(attr.clean("count", &json!(-1)).unwrap_err()[0].message.contains(">= 0"));
        assert!(attr.clean("count", &json!(101)).unwrap_err()[0].message.contains("<= 100"));
    }

    #[test]
    fn test_float_widens_integers() {
        let attr = Attribute::float().min_value(0).max_value(1.0).finalize().unwrap();
        assert_eq!(attr.clean("rate", &json!(1)), Ok(AttrValue::Float(1.0)));
        assert_eq!(attr.to_json(&AttrValue::Float(1.0)), json!(1.0));
        assert_eq!(kinds(attr.clean("rate", &json!(1.5))), vec![ErrorKind::ConstraintViolation]);
        assert_eq!(kinds(attr.clean("rate", &json!(true))), vec![ErrorKind::TypeMismatch]);
    }

    #[test]
    fn test_decimal_accepts_text_and_numbers() {
        let attr = Attribute::decimal();
        let from_text = attr.clean("rate", &json!("0.065")).unwrap();
        assert_eq!(attr.to_json(&from_text), json!("0.065"));

        let from_float = attr.clean("rate", &json!(0.1)).unwrap();
        assert_eq!(attr.to_json(&from_float), json!("0.1"));

        let from_int = attr.clean("rate", &json!(5)).unwrap();
        assert_eq!(attr.to_json(&from_int), json!("5"));
    }

    #[test]
    fn test_decimal_malformed_text_is_coercion_error() {
        let attr = Attribute::decimal();
        let errors = attr.clean("rate", &json!("abc")).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::Coercion);
        assert_eq!(errors[0].message, "rate must be a valid decimal.");
        assert_eq!(kinds(attr.clean("rate", &json!(true))), vec![ErrorKind::TypeMismatch]);
    }

    #[test]
    fn test_decimal_places() {
        let attr = Attribute::decimal().decimal_places(2).finalize().unwrap();
        let ok = attr.clean("amount", &json!("12.34")).unwrap();
        assert_eq!(attr.to_json(&ok), json!("12.34"));

        let errors = attr.clean("amount", &json!("12.345")).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::ConstraintViolation);
        assert!(errors[0].message.contains("2 decimal places"));
    }

    #[test]
    fn test_decimal_max_digits() {
        let attr = Attribute::decimal().max_digits(4).decimal_places(2).finalize().unwrap();
        assert!(attr.clean("x", &json!("12.34")).is_ok());
        assert!(attr.clean("x", &json!("0.005")).is_err());

        let errors = attr.clean("x", &json!("123.4")).unwrap_err();
        assert!(errors[0].message.contains("before the decimal point"), "{errors:?}");

        let errors = attr.clean("x", &json!("12345")).unwrap_err();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].message.contains("4 digits in total"));
    }

    #[test]
    fn test_digit_count_of_small_fraction() {
        let d = parse_decimal("0.005").unwrap();
        assert_eq!(DigitCount::of(&d), DigitCount { total: 3, fractional: 3 });
        let d = parse_decimal("-120.50").unwrap();
        assert_eq!(DigitCount::of(&d), DigitCount { total: 5, fractional: 2 });
    }

    #[test]
    fn test_decimal_bounds_from_mixed_literals() {
        let attr = Attribute::decimal().min_value(0).max_value(1.0).finalize().unwrap();
        assert!(attr.clean("rate", &json!("0.5")).is_ok());
        assert!(attr.clean("rate", &json!("1.01")).unwrap_err()[0].message.contains("<= 1"));
    }

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal(" 12.34 ").unwrap().to_string(), "12.34");
        assert_eq!(parse_decimal("1e3").unwrap(), Decimal::from(1000));
        assert!(parse_decimal("").is_none());
        assert!(parse_decimal("NaN").is_none());
        assert_eq!(parse_decimal("2.5E-3").unwrap().to_string(), "0.0025");
        assert_eq!(parse_decimal("1.25e+1").unwrap().to_string(), "12.5");
        assert_eq!(parse_decimal("0e99999").unwrap(), Decimal::ZERO);
        assert!(parse_decimal("1e").is_none());
        assert!(parse_decimal("1e40").is_none());
        assert!(parse_decimal("1e-29").is_none());
    }

    #[test]
    fn test_exponent_text_is_never_rounded() {
        let attr = Attribute::decimal().finalize().unwrap();
        let plain = "1.2345678901234567890123456789012";
        let errors = attr.clean("d", &json!(plain)).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::Coercion);

        let errors = attr.clean("d", &json!(format!("{plain}e0"))).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::Coercion);
        assert_eq!(errors[0].message, "d must be a valid decimal.");
    }

    #[test]
    fn test_choices_checked_after_coercion() {
        let attr = Attribute::string().choices(["a", "b", "c"]).finalize().unwrap();
        assert!(attr.clean("option", &json!("a")).is_ok());

        let errors = attr.clean("option", &json!("d")).unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::ChoiceViolation);
        assert_eq!(errors[0].message, "option must be one of: 'a', 'b', 'c'.");

        // A type failure never reaches the choices check.
        assert_eq!(kinds(attr.clean("option", &json!(1))), vec![ErrorKind::TypeMismatch]);
    }

    #[test]
    fn test_float_choices_accept_integer_literals() {
        let attr = Attribute::float().choices([1, 2]).finalize().unwrap();
        assert_eq!(attr.clean("f", &json!(2)), Ok(AttrValue::Float(2.0)));
        assert!(attr.clean("f", &json!(2.5)).is_err());
    }

    #[test]
    fn test_misconfiguration_reported_on_finalize() {
        assert!(Attribute::boolean().max_length(3).finalize().is_err());
        assert!(Attribute::string().min_value(1).finalize().is_err());
        assert!(Attribute::integer().min_value(1.5).finalize().is_err());
        assert!(Attribute::integer().min_value(5).max_value(1).finalize().is_err());
        assert!(Attribute::decimal().max_digits(2).decimal_places(3).finalize().is_err());
        assert!(Attribute::integer().choices(["x"]).finalize().is_err());
        assert!(Attribute::integer().default("abc").finalize().is_err());
        assert!(Attribute::boolean().default(1).finalize().is_err());
    }

    #[test]
    fn test_default_fitted_to_kind_but_not_bounds() {
        let attr = Attribute::decimal().default(1).finalize().unwrap();
        assert_eq!(attr.default_value(), Some(&AttrValue::Decimal(Decimal::ONE)));

        let attr = Attribute::integer().max_value(10).default(50).finalize().unwrap();
        assert_eq!(attr.default_value(), Some(&AttrValue::Integer(50)));
    }

    #[test]
    fn test_default_rendering_and_decoding() {
        let attr = Attribute::decimal().optional().default(Decimal::new(5, 2));
        assert_eq!(attr.from_default(), Some(json!("0.05")));

        let int_default = Attribute::decimal().default(1);
        assert_eq!(int_default.from_default(), Some(json!("1")));

        assert_eq!(attr.from_json(&json!("0.065")), Some(AttrValue::Decimal(Decimal::new(65, 3))));
        assert_eq!(attr.from_json(&json!("garbage")), Some(AttrValue::Decimal(Decimal::new(5, 2))));
        assert_eq!(attr.from_json(&Value::Null), Some(AttrValue::Decimal(Decimal::new(5, 2))));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Decimal text is stored exactly as parsed, trailing zeros included.
        #[test]
        fn decimal_text_is_stored_verbatim(mantissa in any::<i64>(), scale in 0u32..=12) {
            let text = Decimal::new(mantissa, scale).to_string();
            let attr = Attribute::decimal();
            let value = attr.clean("d", &Value::String(text.clone())).unwrap();
            prop_assert_eq!(attr.to_json(&value), Value::String(text));
        }

        /// Integers inside the bounds are accepted, outside are rejected.
        #[test]
        fn integer_bounds_are_inclusive(n in -1000i64..1000) {
            let attr = Attribute::integer().min_value(-10).max_value(10).finalize().unwrap();
            let accepted = attr.clean("n", &Value::from(n)).is_ok();
            prop_assert_eq!(accepted, (-10..=10).contains(&n));
        }
    }
}
