use crate::units::UnitKey;
use crate::value::{UnitMeasurements, Value};

/// Produces the right-hand side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub enum Calculator {
    /// Fixed number or keyword, independent of layout
    Constant(Value),
    /// `magnitude` times the pixel equivalent of `unit`
    Length { magnitude: f64, unit: UnitKey },
}

impl Calculator {
    pub fn constant(value: impl Into<Value>) -> Self {
        Calculator::Constant(value.into())
    }

    pub fn length(magnitude: f64, unit: impl Into<UnitKey>) -> Self {
        Calculator::Length {
            magnitude,
            unit: unit.into(),
        }
    }

    /// Resolves the value against the current measurement table.
    ///
    /// A unit missing from the table resolves to NaN, which fails every
    /// comparison.
    pub fn calculate(&self, measurements: &UnitMeasurements) -> Value {
        match self {
            Calculator::Constant(value) => *value,
            Calculator::Length { magnitude, unit } => {
                let pixels = measurements.get(unit).unwrap_or(f64::NAN);
                Value::Number(magnitude * pixels)
            }
        }
    }

    /// Unit this calculator needs measured, if any
    pub fn unit(&self) -> Option<UnitKey> {
        match self {
            Calculator::Constant(_) => None,
            Calculator::Length { unit, .. } => Some(*unit),
        }
    }
}
