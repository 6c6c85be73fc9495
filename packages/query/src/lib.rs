//! # Element Adapter Query
//!
//! Query language for container-relative behaviors.
//!
//! ```text
//! "width >= 6.25em && height < 50%, aspect-ratio <= 1.78"
//!        │ validate (grammar)
//!        ▼
//! CompiledQuery: [[width >= 6.25em, height < 50%h], [aspect-ratio <= 1.78]]
//!        │ evaluate(measurements, properties)
//!        ▼
//!      bool
//! ```
//!
//! Commas separate alternatives, `&&` joins the comparisons of one
//! alternative. Unit-bearing literals are resolved at evaluation time from a
//! [`UnitMeasurements`] table supplied by the caller.

pub mod calculator;
pub mod comparator;
pub mod compiler;
pub mod dimensions;
pub mod error;
pub mod property;
pub mod units;
pub mod utils;
pub mod validator;
pub mod value;

#[cfg(test)]
mod tests_compiler;

pub use calculator::Calculator;
pub use comparator::{Comparator, Operator};
pub use compiler::{
    classify_literal, compile, compile_query_list, Compilation, CompiledEntry, CompiledQuery,
    CompiledQueryList, Literal, Term,
};
pub use dimensions::{compute_orientation, compute_ratio};
pub use error::{EvalError, EvalResult, QueryError, QueryResult};
pub use property::{Orientation, Property};
pub use units::{Axis, LengthUnit, UnitKey};
pub use validator::{is_valid, validate, validate_all};
pub use value::{format_number, UnitMeasurements, Value};
