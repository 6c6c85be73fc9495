use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised while validating or compiling query text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("invalid query \"{query}\"")]
    InvalidQuery { query: String },

    #[error("unknown property \"{name}\"")]
    UnknownProperty { name: String },

    #[error("unknown unit \"{name}\"")]
    UnknownUnit { name: String },

    #[error("unknown comparator \"{symbol}\"")]
    UnknownOperator { symbol: String },

    #[error("unknown orientation \"{name}\"")]
    UnknownOrientation { name: String },
}

impl QueryError {
    pub fn invalid_query(query: impl Into<String>) -> Self {
        Self::InvalidQuery {
            query: query.into(),
        }
    }

    pub fn unknown_property(name: impl Into<String>) -> Self {
        Self::UnknownProperty { name: name.into() }
    }

    pub fn unknown_unit(name: impl Into<String>) -> Self {
        Self::UnknownUnit { name: name.into() }
    }

    pub fn unknown_operator(symbol: impl Into<String>) -> Self {
        Self::UnknownOperator {
            symbol: symbol.into(),
        }
    }

    pub fn unknown_orientation(name: impl Into<String>) -> Self {
        Self::UnknownOrientation { name: name.into() }
    }
}

/// Errors raised while evaluating a compiled comparison
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("type mismatch: a({observed}) is {observed_kind} and b({target}) is {target_kind}")]
    TypeMismatch {
        observed: String,
        observed_kind: &'static str,
        target: String,
        target_kind: &'static str,
    },
}

impl EvalError {
    pub fn type_mismatch(
        observed: impl Into<String>,
        observed_kind: &'static str,
        target: impl Into<String>,
        target_kind: &'static str,
    ) -> Self {
        Self::TypeMismatch {
            observed: observed.into(),
            observed_kind,
            target: target.into(),
            target_kind,
        }
    }
}
