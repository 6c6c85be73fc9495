use crate::property::Orientation;
use crate::units::UnitKey;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Scalar or keyword value of a property or a query literal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Orientation(Orientation),
}

impl Value {
    /// Primitive kind used for type checking comparisons
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Orientation(_) => "string",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Orientation(_) => None,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            // Keywords have equality but no order
            (Value::Orientation(a), Value::Orientation(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Orientation(o) => f.write_str(o.as_str()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<Orientation> for Value {
    fn from(o: Orientation) -> Self {
        Value::Orientation(o)
    }
}

/// Formats a number the way style values expect it: integral values without
/// a fractional part, non-finite values spelled out, exponent notation below
/// 1e-6 and from 1e21 on, and no negative zero.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let formatted = format!("{n:e}");
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    } else {
        n.to_string()
    }
}

/// Pixel equivalent of one unit, for each unit a query needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitMeasurements {
    values: HashMap<UnitKey, f64>,
}

impl UnitMeasurements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<UnitKey>, pixels: f64) {
        self.values.insert(key.into(), pixels);
    }

    pub fn with(mut self, key: impl Into<UnitKey>, pixels: f64) -> Self {
        self.insert(key, pixels);
        self
    }

    pub fn get(&self, key: &UnitKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn extend(&mut self, other: UnitMeasurements) {
        self.values.extend(other.values);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UnitKey, &f64)> {
        self.values.iter()
    }
}
