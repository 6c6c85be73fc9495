/// Compilation and evaluation of complete queries
use crate::*;
use std::collections::HashMap;

fn props(values: &[(Property, Value)]) -> impl Fn(Property) -> Option<Value> {
    let map: HashMap<Property, Value> = values.iter().copied().collect();
    move |property| map.get(&property).copied()
}

#[test]
fn test_compile_builds_clauses_and_terms() {
    let compilation =
        compile("width >= 6.25em && height < 50%, aspect-ratio <= 1.5, width >= 680px").unwrap();

    let expected = CompiledQuery::new(vec![
        vec![
            Term::new(
                Property::Width,
                Comparator::greater_than_or_equal(Calculator::length(6.25, LengthUnit::Em)),
            ),
            Term::new(
                Property::Height,
                Comparator::lesser_than(Calculator::length(50.0, Axis::Height)),
            ),
        ],
        vec![Term::new(
            Property::AspectRatio,
            Comparator::lesser_than_or_equal(Calculator::constant(1.5)),
        )],
        vec![Term::new(
            Property::Width,
            Comparator::greater_than_or_equal(Calculator::constant(680.0)),
        )],
    ]);

    assert_eq!(compilation.query, expected);
    assert_eq!(compilation.units, vec![LengthUnit::Em]);
    assert_eq!(compilation.percent_units, vec![Axis::Height]);
    assert_eq!(
        compilation.properties,
        vec![Property::Width, Property::Height, Property::AspectRatio, Property::Width]
    );
}

#[test]
fn test_compile_is_deterministic() {
    let text = "orientation == landscape && height < 10.325em, children >= 2";
    assert_eq!(compile(text).unwrap(), compile(text).unwrap());
}

#[test]
fn test_compile_is_case_and_whitespace_insensitive() {
    let loose = compile("  WIDTH   >   75%  ,Orientation == SQUARE ").unwrap();
    let tight = compile("width > 75%, orientation == square").unwrap();
    assert_eq!(loose.query, tight.query);
}

#[test]
fn test_width_percent_uses_width_axis() {
    let compilation = compile("width > 75%").unwrap();
    assert_eq!(compilation.percent_units, vec![Axis::Width]);
    assert!(compilation.units.is_empty());
}

#[test]
fn test_width_boundary_at_greater_than_or_equal() {
    let query = compile("width >= 680px").unwrap().query;
    let measurements = UnitMeasurements::new();

    assert!(query
        .evaluate(&measurements, props(&[(Property::Width, Value::Number(680.0))]))
        .unwrap());
    assert!(!query
        .evaluate(&measurements, props(&[(Property::Width, Value::Number(679.0))]))
        .unwrap());
}

#[test]
fn test_aspect_ratio_boundary() {
    let query = compile("aspect-ratio <= 1.7777777777").unwrap().query;
    let measurements = UnitMeasurements::new();

    let ratio = |width: f64, height: f64| {
        props(&[(Property::AspectRatio, Value::Number(compute_ratio(width, height)))])
    };

    // 160 / 90 = 1.77777...78, just above the literal
    assert!(!query.evaluate(&measurements, ratio(160.0, 90.0)).unwrap());
    assert!(query.evaluate(&measurements, ratio(160.0, 91.0)).unwrap());
}

#[test]
fn test_query_true_when_one_clause_matches() {
    let query = compile("width >= 6.25em && height < 50%, aspect-ratio <= 1.7777777777777777, width >= 680px")
        .unwrap()
        .query;
    let measurements = UnitMeasurements::new()
        .with(LengthUnit::Em, 1.0)
        .with(Axis::Height, 2.0);

    let matching = props(&[
        (Property::Width, Value::Number(7.0)),
        (Property::Height, Value::Number(98.0)),
        (Property::AspectRatio, Value::Number(2.0)),
    ]);
    assert!(query.evaluate(&measurements, matching).unwrap());

    let failing = props(&[
        (Property::Width, Value::Number(6.0)),
        (Property::Height, Value::Number(98.0)),
        (Property::AspectRatio, Value::Number(2.0)),
    ]);
    assert!(!query.evaluate(&measurements, failing).unwrap());
}

#[test]
fn test_orientation_query() {
    let query = compile("orientation == portrait").unwrap().query;
    let measurements = UnitMeasurements::new();

    assert!(query
        .evaluate(
            &measurements,
            props(&[(Property::Orientation, compute_orientation(90.0, 160.0).into())])
        )
        .unwrap());
    assert!(!query
        .evaluate(
            &measurements,
            props(&[(Property::Orientation, compute_orientation(160.0, 90.0).into())])
        )
        .unwrap());
}

#[test]
fn test_type_mismatch_propagates_out_of_evaluation() {
    let query = CompiledQuery::new(vec![vec![Term::new(
        Property::Children,
        Comparator::equal(Calculator::constant(Orientation::Square)),
    )]]);

    let err = query
        .evaluate(
            &UnitMeasurements::new(),
            props(&[(Property::Children, Value::Number(2.0))]),
        )
        .unwrap_err();

    assert_eq!(
        err,
        EvalError::type_mismatch("2", "number", "square", "string")
    );
}

#[test]
fn test_short_circuit_skips_later_terms() {
    // The second term would mismatch, but the first already fails the clause
    let query = CompiledQuery::new(vec![vec![
        Term::new(Property::Width, Comparator::greater_than(Calculator::constant(100.0))),
        Term::new(
            Property::Width,
            Comparator::equal(Calculator::constant(Orientation::Square)),
        ),
    ]]);

    let result = query.evaluate(
        &UnitMeasurements::new(),
        props(&[(Property::Width, Value::Number(10.0))]),
    );
    assert_eq!(result, Ok(false));
}

#[test]
fn test_compile_query_list_dedups_metadata() {
    let compiled = compile_query_list(vec![
        ("width >= 6.25em && height < 50%".to_string(), "a"),
        ("orientation == landscape && height < 10.325em".to_string(), "b"),
        ("width > 75%".to_string(), "c"),
        ("characters > 10 && height <= 13.56%".to_string(), "d"),
        ("children >= 2 && children < 5".to_string(), "e"),
    ])
    .unwrap();

    assert_eq!(compiled.len(), 5);
    assert_eq!(compiled.entries[2].behavior, "c");
    assert_eq!(compiled.units, vec![LengthUnit::Em]);
    assert_eq!(compiled.percent_units, vec![Axis::Height, Axis::Width]);
    assert_eq!(
        compiled.properties,
        vec![
            Property::Width,
            Property::Height,
            Property::Orientation,
            Property::Characters,
            Property::Children,
        ]
    );
}

#[test]
fn test_compile_query_list_is_atomic() {
    let err = compile_query_list(vec![
        ("width > 10px".to_string(), 1),
        ("characters > 1.5".to_string(), 2),
    ])
    .unwrap_err();

    assert_eq!(err, QueryError::invalid_query("characters > 1.5"));
}

#[test]
fn test_compiled_query_display() {
    let compilation = compile("width >= 6.25em && height < 50%, orientation == square").unwrap();
    assert_eq!(
        compilation.query.to_string(),
        "width >= 6.25em && height < 50h%, orientation == square"
    );
}
