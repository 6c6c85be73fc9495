use crate::calculator::Calculator;
use crate::comparator::{Comparator, Operator};
use crate::error::{EvalResult, QueryError, QueryResult};
use crate::property::{Orientation, Property};
use crate::units::{Axis, LengthUnit};
use crate::utils::dedup;
use crate::validator::{validate, validate_all};
use crate::value::{UnitMeasurements, Value};
use std::fmt;
use tracing::{debug, instrument};

/// Shape of a literal on the right-hand side of a comparison
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    /// Bare number or pixel length
    Number(f64),
    Keyword(Orientation),
    Length(f64, LengthUnit),
    /// Percentage of the containing block along an axis
    Percent(f64, Axis),
}

impl Literal {
    pub fn into_calculator(self) -> Calculator {
        match self {
            Literal::Number(n) => Calculator::constant(n),
            Literal::Keyword(keyword) => Calculator::constant(keyword),
            Literal::Length(magnitude, unit) => Calculator::length(magnitude, unit),
            Literal::Percent(magnitude, axis) => Calculator::length(magnitude, axis),
        }
    }
}

/// Classifies a lower-cased literal. `%` takes the axis of the property it
/// qualifies; `px` is a plain number.
pub fn classify_literal(property: Property, literal: &str) -> QueryResult<Literal> {
    let split = literal
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(literal.len());
    let (number, suffix) = literal.split_at(split);

    if number.is_empty() {
        return literal.parse::<Orientation>().map(Literal::Keyword);
    }

    let magnitude: f64 = number
        .parse()
        .map_err(|_| QueryError::invalid_query(literal))?;

    match suffix {
        "" | "px" => Ok(Literal::Number(magnitude)),
        "%" => Axis::for_property(property)
            .map(|axis| Literal::Percent(magnitude, axis))
            .ok_or_else(|| QueryError::invalid_query(literal)),
        unit => unit
            .parse::<LengthUnit>()
            .map(|unit| Literal::Length(magnitude, unit)),
    }
}

/// One comparison of a property against a resolved value
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub property: Property,
    pub comparator: Comparator,
}

impl Term {
    pub fn new(property: Property, comparator: Comparator) -> Self {
        Self {
            property,
            comparator,
        }
    }

    pub fn evaluate<F>(&self, measurements: &UnitMeasurements, lookup: F) -> EvalResult<bool>
    where
        F: Fn(Property) -> Option<Value>,
    {
        self.comparator.compare(measurements, lookup(self.property))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.property, self.comparator)
    }
}

/// Disjunction of conjunctions of terms
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledQuery {
    pub clauses: Vec<Vec<Term>>,
}

impl CompiledQuery {
    pub fn new(clauses: Vec<Vec<Term>>) -> Self {
        Self { clauses }
    }

    /// True when every term of at least one clause holds. Evaluation stops
    /// at the first failing term of a clause and at the first matching clause.
    pub fn evaluate<F>(&self, measurements: &UnitMeasurements, lookup: F) -> EvalResult<bool>
    where
        F: Fn(Property) -> Option<Value>,
    {
        'clauses: for clause in &self.clauses {
            for term in clause {
                if !term.evaluate(measurements, &lookup)? {
                    continue 'clauses;
                }
            }
            return Ok(true);
        }
        Ok(false)
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.clauses.iter().flatten()
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clauses = self
            .clauses
            .iter()
            .map(|clause| {
                clause
                    .iter()
                    .map(Term::to_string)
                    .collect::<Vec<_>>()
                    .join(" && ")
            })
            .collect::<Vec<_>>();
        f.write_str(&clauses.join(", "))
    }
}

/// Result of compiling one query
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub query: CompiledQuery,
    /// Units measured against the element itself, in order of appearance
    pub units: Vec<LengthUnit>,
    /// Percentage axes measured against the containing block
    pub percent_units: Vec<Axis>,
    /// Properties referenced, in order of appearance
    pub properties: Vec<Property>,
}

/// Validates and compiles query text
pub fn compile(text: &str) -> QueryResult<Compilation> {
    validate(text)?;

    let normalized = text.trim().to_lowercase();
    let mut clauses = Vec::new();
    let mut units = Vec::new();
    let mut percent_units = Vec::new();
    let mut properties = Vec::new();

    for clause_text in normalized.split(',') {
        let mut clause = Vec::new();

        for term_text in clause_text.split("&&") {
            let mut parts = term_text.split_whitespace();
            let (Some(property), Some(operator), Some(literal), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                return Err(QueryError::invalid_query(text));
            };

            let property: Property = property.parse()?;
            let operator: Operator = operator.parse()?;
            let literal = classify_literal(property, literal)?;

            match literal {
                Literal::Length(_, unit) => units.push(unit),
                Literal::Percent(_, axis) => percent_units.push(axis),
                Literal::Number(_) | Literal::Keyword(_) => {}
            }

            properties.push(property);
            clause.push(Term::new(
                property,
                Comparator::new(operator, literal.into_calculator()),
            ));
        }

        clauses.push(clause);
    }

    Ok(Compilation {
        query: CompiledQuery::new(clauses),
        units,
        percent_units,
        properties,
    })
}

/// A compiled query paired with whatever it drives
#[derive(Debug)]
pub struct CompiledEntry<B> {
    pub text: String,
    pub query: CompiledQuery,
    pub behavior: B,
}

/// Compiled queries plus the deduplicated units, axes and properties they
/// reference
#[derive(Debug)]
pub struct CompiledQueryList<B> {
    pub entries: Vec<CompiledEntry<B>>,
    pub units: Vec<LengthUnit>,
    pub percent_units: Vec<Axis>,
    pub properties: Vec<Property>,
}

impl<B> CompiledQueryList<B> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compiles a list of queries. Every query is validated before any is
/// compiled, so one invalid text rejects the whole list.
#[instrument(skip_all)]
pub fn compile_query_list<B>(
    queries: impl IntoIterator<Item = (String, B)>,
) -> QueryResult<CompiledQueryList<B>> {
    let queries: Vec<(String, B)> = queries.into_iter().collect();
    validate_all(queries.iter().map(|(text, _)| text.as_str()))?;

    let mut entries = Vec::with_capacity(queries.len());
    let mut units = Vec::new();
    let mut percent_units = Vec::new();
    let mut properties = Vec::new();

    for (text, behavior) in queries {
        let compilation = compile(&text)?;
        debug!(query = %text, compiled = %compilation.query, "Compiled query");

        units.extend(compilation.units);
        percent_units.extend(compilation.percent_units);
        properties.extend(compilation.properties);

        entries.push(CompiledEntry {
            text,
            query: compilation.query,
            behavior,
        });
    }

    Ok(CompiledQueryList {
        entries,
        units: dedup(units),
        percent_units: dedup(percent_units),
        properties: dedup(properties),
    })
}
