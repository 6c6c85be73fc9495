use element_adapter_query::{EvalError, Property, QueryError};
use thiserror::Error;

pub type AttachResult<T> = Result<T, AttachError>;

/// Setup failures. Nothing is wired when attaching fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttachError {
    #[error("{message}")]
    InvalidTarget { message: String },

    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    #[error("{message}")]
    InvalidOption { message: String },

    #[error("no property to watch: queries reference none and no watchedProperties were given")]
    NoWatchedProperties,

    #[error("initial evaluation failed: {0}")]
    Evaluation(#[from] EvalError),
}

impl AttachError {
    pub fn empty_target() -> Self {
        Self::InvalidTarget {
            message: "at least one Element must be provided as target".to_string(),
        }
    }

    pub fn invalid_target(items: &[String]) -> Self {
        Self::InvalidTarget {
            message: format!(
                "target must be an Element or a list of Elements. Actual:\n[{}]",
                items.join(", ")
            ),
        }
    }

    pub fn invalid_watched_properties(offending: Option<&str>) -> Self {
        let mut message = format!(
            "watchedProperties must be an array with at least one of {}",
            Property::names()
        );
        if let Some(value) = offending {
            message.push_str(&format!(" (got \"{value}\")"));
        }
        Self::InvalidOption { message }
    }
}

/// Failures loading a declarative configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
