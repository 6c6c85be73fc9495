//! Grammar check for query text.
//!
//! A query is a comma separated list of clauses, each clause a `&&`
//! separated list of `property comparator value` comparisons. Operators must
//! be surrounded by whitespace; matching is case-insensitive.

use crate::error::{QueryError, QueryResult};
use crate::units::LengthUnit;
use regex::Regex;
use std::sync::LazyLock;

static QUERY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&query_pattern()).expect("query grammar pattern is a valid regex")
});

fn query_pattern() -> String {
    let units = LengthUnit::ALL
        .iter()
        .map(LengthUnit::as_str)
        .chain(["%", "px"])
        .collect::<Vec<_>>()
        .join("|");

    let integer_comparison = r"(?:(?:>|<)=?|==)\s+\d+";
    let float_comparison = format!(r"{integer_comparison}(?:\.\d+)?");

    let dimension = format!(r"(?:width|height)\s+{float_comparison}(?:{units})");
    let count = format!(r"(?:characters|children)\s+{integer_comparison}");
    let aspect_ratio = format!(r"aspect-ratio\s+{float_comparison}");
    let orientation = r"orientation\s+==\s+(?:landscape|portrait|square)";

    let comparison = format!("(?:{dimension}|{count}|{aspect_ratio}|{orientation})");
    let clause = format!(r"{comparison}(?:\s+&&\s+{comparison})*");

    format!(r"(?i)^\s*{clause}(?:\s*,\s*{clause})*\s*$")
}

/// Returns true if `query` matches the query grammar
pub fn is_valid(query: &str) -> bool {
    QUERY_PATTERN.is_match(query)
}

/// Checks a single query, naming it verbatim on failure
pub fn validate(query: &str) -> QueryResult<()> {
    if is_valid(query) {
        Ok(())
    } else {
        Err(QueryError::invalid_query(query))
    }
}

/// Checks every query before any of them is used; the first invalid one
/// rejects the whole set.
pub fn validate_all<'a>(queries: impl IntoIterator<Item = &'a str>) -> QueryResult<()> {
    queries.into_iter().try_for_each(validate)
}
