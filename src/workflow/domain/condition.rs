//! Single-field conditions evaluated against entity snapshots.

use super::WorkflowDomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::num::FpCategory;

/// Comparison applied between an entity field and the configured value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `in`: the field value is one of the configured values, or a substring
    /// of the configured string.
    In,
    /// `contains`: the field value (string or list) contains the configured
    /// value.
    Contains,
    /// Operator read from storage that the evaluator does not know. Never
    /// matches.
    Unsupported(String),
}

impl ConditionOperator {
    /// Parses an operator token. Unknown tokens become
    /// [`ConditionOperator::Unsupported`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "==" => Self::Eq,
            "!=" => Self::Ne,
            ">=" => Self::Ge,
            "<=" => Self::Le,
            ">" => Self::Gt,
            "<" => Self::Lt,
            "in" => Self::In,
            "contains" => Self::Contains,
            _ => Self::Unsupported(raw.to_owned()),
        }
    }

    /// Returns the operator token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::In => "in",
            Self::Contains => "contains",
            Self::Unsupported(raw) => raw,
        }
    }

    /// Returns whether the evaluator understands this operator.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ConditionOperator {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ConditionOperator> for String {
    fn from(value: ConditionOperator) -> Self {
        match value {
            ConditionOperator::Unsupported(raw) => raw,
            supported => supported.as_str().to_owned(),
        }
    }
}

/// `field operator value` check against an entity snapshot.
///
/// When the field's type differs from the configured value's type, the field
/// is coerced to the configured type first (`"85"` compares as `85` against
/// a number). Missing fields, failed coercions and unsupported operators
/// never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    field: String,
    operator: ConditionOperator,
    value: Value,
}

impl Condition {
    /// Creates a validated condition.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowDomainError::EmptyConditionField`] for a blank field
    /// or [`WorkflowDomainError::UnsupportedOperator`] for an unknown
    /// operator.
    pub fn new(
        field: impl Into<String>,
        operator: ConditionOperator,
        value: Value,
    ) -> Result<Self, WorkflowDomainError> {
        let trimmed = field.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(WorkflowDomainError::EmptyConditionField);
        }
        if let ConditionOperator::Unsupported(raw) = &operator {
            return Err(WorkflowDomainError::UnsupportedOperator(raw.clone()));
        }
        Ok(Self {
            field: trimmed,
            operator,
            value,
        })
    }

    /// Returns the entity field name.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> &ConditionOperator {
        &self.operator
    }

    /// Returns the configured value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// Returns whether `data` satisfies the condition.
    #[must_use]
    pub fn evaluate(&self, data: &Map<String, Value>) -> bool {
        let Some(actual) = data.get(&self.field) else {
            return false;
        };
        let expected = &self.value;
        match &self.operator {
            ConditionOperator::Eq => loosely_equal(actual, expected) == Some(true),
            ConditionOperator::Ne => loosely_equal(actual, expected) == Some(false),
            ConditionOperator::Ge => matches!(
                order(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            ConditionOperator::Le => {
                matches!(order(actual, expected), Some(Ordering::Less | Ordering::Equal))
            }
            ConditionOperator::Gt => order(actual, expected) == Some(Ordering::Greater),
            ConditionOperator::Lt => order(actual, expected) == Some(Ordering::Less),
            ConditionOperator::In => is_member(actual, expected),
            ConditionOperator::Contains => is_member(expected, actual),
            ConditionOperator::Unsupported(_) => false,
        }
    }
}

/// Scalar view of a JSON value used for comparisons.
#[derive(Debug, PartialEq)]
enum Scalar<'a> {
    Number(f64),
    Text(Cow<'a, str>),
    Bool(bool),
}

impl<'a> Scalar<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        match value {
            Value::Number(number) => number.as_f64().map(Self::Number),
            Value::String(text) => Some(Self::Text(Cow::Borrowed(text))),
            Value::Bool(flag) => Some(Self::Bool(*flag)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Converts `actual` to the scalar type of `like`.
    fn coerce(actual: &'a Value, like: &Value) -> Option<Self> {
        match like {
            Value::Number(_) => coerce_number(actual).map(Self::Number),
            Value::String(_) => coerce_text(actual).map(Self::Text),
            Value::Bool(_) => coerce_bool(actual).map(Self::Bool),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Number(left), Self::Number(right)) => left.partial_cmp(right),
            (Self::Text(left), Self::Text(right)) => Some(left.cmp(right)),
            (Self::Bool(left), Self::Bool(right)) => Some(left.cmp(right)),
            _ => None,
        }
    }
}

fn coerce_number(actual: &Value) -> Option<f64> {
    match actual {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite()),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_text(actual: &Value) -> Option<Cow<'_, str>> {
    match actual {
        Value::String(text) => Some(Cow::Borrowed(text)),
        Value::Number(number) => Some(Cow::Owned(number.to_string())),
        Value::Bool(flag) => Some(Cow::Owned(flag.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn coerce_bool(actual: &Value) -> Option<bool> {
    match actual {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        Value::Number(number) => number
            .as_f64()
            .map(|parsed| parsed.classify() != FpCategory::Zero),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Orders `actual` against `expected` after coercion.
fn order(actual: &Value, expected: &Value) -> Option<Ordering> {
    let left = Scalar::coerce(actual, expected)?;
    let right = Scalar::from_value(expected)?;
    left.compare(&right)
}

/// Equality after coercion. Non-scalar expected values compare structurally.
fn loosely_equal(actual: &Value, expected: &Value) -> Option<bool> {
    match expected {
        Value::Null | Value::Array(_) | Value::Object(_) => Some(actual == expected),
        Value::Number(_) | Value::String(_) | Value::Bool(_) => {
            order(actual, expected).map(|ordering| ordering == Ordering::Equal)
        }
    }
}

/// Returns whether `needle` is an element of the `haystack` list or a
/// substring of the `haystack` string.
fn is_member(needle: &Value, haystack: &Value) -> bool {
    match haystack {
        Value::Array(items) => items
            .iter()
            .any(|item| loosely_equal(needle, item) == Some(true)),
        Value::String(text) => {
            coerce_text(needle).is_some_and(|fragment| text.contains(fragment.as_ref()))
        }
        Value::Null | Value::Number(_) | Value::Bool(_) | Value::Object(_) => false,
    }
}
