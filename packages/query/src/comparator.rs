use crate::calculator::Calculator;
use crate::error::{EvalError, EvalResult, QueryError};
use crate::value::{UnitMeasurements, Value};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a query term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<")]
    LesserThan,
    #[serde(rename = "<=")]
    LesserThanOrEqual,
    #[serde(rename = "==")]
    Equal,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::LesserThan => "<",
            Operator::LesserThanOrEqual => "<=",
            Operator::Equal => "==",
        }
    }

    /// Whether an observed-vs-target ordering satisfies this operator.
    /// Unordered operands (NaN, distinct keywords) satisfy nothing.
    pub fn accepts(&self, ordering: Option<Ordering>) -> bool {
        match self {
            Operator::GreaterThan => ordering == Some(Ordering::Greater),
            Operator::GreaterThanOrEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
            Operator::LesserThan => ordering == Some(Ordering::Less),
            Operator::LesserThanOrEqual => {
                matches!(ordering, Some(Ordering::Less | Ordering::Equal))
            }
            Operator::Equal => ordering == Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Operator::GreaterThan),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            "<" => Ok(Operator::LesserThan),
            "<=" => Ok(Operator::LesserThanOrEqual),
            "==" => Ok(Operator::Equal),
            _ => Err(QueryError::unknown_operator(s)),
        }
    }
}

/// An operator bound to the calculator producing its right-hand side
#[derive(Debug, Clone, PartialEq)]
pub struct Comparator {
    pub operator: Operator,
    pub calculator: Calculator,
}

impl Comparator {
    pub fn new(operator: Operator, calculator: Calculator) -> Self {
        Self {
            operator,
            calculator,
        }
    }

    pub fn greater_than(calculator: Calculator) -> Self {
        Self::new(Operator::GreaterThan, calculator)
    }

    pub fn greater_than_or_equal(calculator: Calculator) -> Self {
        Self::new(Operator::GreaterThanOrEqual, calculator)
    }

    pub fn lesser_than(calculator: Calculator) -> Self {
        Self::new(Operator::LesserThan, calculator)
    }

    pub fn lesser_than_or_equal(calculator: Calculator) -> Self {
        Self::new(Operator::LesserThanOrEqual, calculator)
    }

    pub fn equal(calculator: Calculator) -> Self {
        Self::new(Operator::Equal, calculator)
    }

    /// Compares an observed property value with the resolved target value.
    ///
    /// Both sides must share a primitive kind; a mismatch (including a
    /// missing observed value) is an authoring error, not a false result.
    pub fn compare(&self, measurements: &UnitMeasurements, observed: Option<Value>) -> EvalResult<bool> {
        let target = self.calculator.calculate(measurements);

        let observed = match observed {
            Some(value) if value.kind() == target.kind() => value,
            Some(value) => {
                return Err(EvalError::type_mismatch(
                    value.to_string(),
                    value.kind(),
                    target.to_string(),
                    target.kind(),
                ))
            }
            None => {
                return Err(EvalError::type_mismatch(
                    "undefined",
                    "undefined",
                    target.to_string(),
                    target.kind(),
                ))
            }
        };

        Ok(self.operator.accepts(observed.partial_cmp(&target)))
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.calculator {
            Calculator::Constant(value) => write!(f, "{} {}", self.operator, value),
            Calculator::Length { magnitude, unit } => {
                write!(f, "{} {}{}", self.operator, magnitude, unit)
            }
        }
    }
}
