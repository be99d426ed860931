use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw covariate value read from a subject record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Numeric reading (integers are widened to `f64`).
    Number(f64),
    /// Textual reading, e.g. a form choice.
    Text(String),
}

impl AttributeValue {
    /// Returns `true` for textual values.
    pub fn is_text(&self) -> bool {
        matches!(self, AttributeValue::Text(_))
    }

    /// Key used to match the value against declared or observed categories.
    ///
    /// Numbers render in their shortest form (`3`, not `3.0`) so that a
    /// numeric reading matches a textual category declaration.
    pub fn category_key(&self) -> String {
        match self {
            AttributeValue::Number(value) => value.to_string(),
            AttributeValue::Text(text) => text.clone(),
        }
    }

    /// Interprets the value as a finite number, parsing text when necessary.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            AttributeValue::Number(value) => *value,
            AttributeValue::Text(text) => text.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Total order used when enumerating distinct categories: numbers first in
    /// numeric order, then text in lexicographic order.
    pub fn category_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (AttributeValue::Number(a), AttributeValue::Number(b)) => a.total_cmp(b),
            (AttributeValue::Number(_), AttributeValue::Text(_)) => Ordering::Less,
            (AttributeValue::Text(_), AttributeValue::Number(_)) => Ordering::Greater,
            (AttributeValue::Text(a), AttributeValue::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.category_key())
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// One of the two treatment arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arm {
    /// Arm 0.
    Control,
    /// Arm 1.
    Treatment,
}

impl Arm {
    /// Returns the numeric code of the arm (`0` or `1`).
    pub const fn code(self) -> u8 {
        match self {
            Arm::Control => 0,
            Arm::Treatment => 1,
        }
    }

    /// Returns the opposite arm.
    pub const fn other(self) -> Self {
        match self {
            Arm::Control => Arm::Treatment,
            Arm::Treatment => Arm::Control,
        }
    }
}

/// Arm as emitted to callers: the raw code, or the configured label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArmLabel {
    /// Numeric arm code when no labels were configured.
    Code(u8),
    /// Configured treatment label.
    Label(String),
}

impl fmt::Display for ArmLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArmLabel::Code(code) => write!(f, "{code}"),
            ArmLabel::Label(label) => f.write_str(label),
        }
    }
}
