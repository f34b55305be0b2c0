use compgraph::mappers::{BinaryArithmeticOperation, DatetimeExtractor, Duration, Haversine, StrToInt};
use compgraph::reducers::TopN;
use compgraph::{Mapper, Reducer, Row, Value};

fn row(pairs: impl IntoIterator<Item = (&'static str, Value)>) -> Row {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn binary_arithmetic_operation_stores_closure_result() {
    let r = row([("a", Value::Int(4)), ("b", Value::Int(2))]);
    let mapper = BinaryArithmeticOperation::new(
        |row: &Row| Ok(row["a"].as_f64().unwrap() / row["b"].as_f64().unwrap()),
        "ratio",
    );
    let out = mapper.apply(r).unwrap();
    assert_eq!(out[0].get("ratio"), Some(&Value::Float(2.0)));
}

#[test]
fn haversine_distance_matches_reference_values() {
    let r = row([
        ("start", Value::Point(vec![37.61, 55.76])),
        ("end", Value::Point(vec![37.61, 55.76001])),
    ]);
    let out = Haversine::new("start", "end", "dist").apply(r).unwrap();
    let dist = out[0].get("dist").unwrap().as_f64().unwrap();
    assert!((dist - 0.0011).abs() < 0.001, "distance was {dist}");
}

#[test]
fn datetime_extractor_reads_weekday() {
    let r = row([("t", Value::Str("20171020T112238".into()))]);
    let out = DatetimeExtractor::new("t", "%a", "weekday").apply(r).unwrap();
    assert_eq!(out[0].get("weekday"), Some(&Value::Str("Fri".into())));
}

#[test]
fn duration_computes_hours_between_timestamps() {
    let r = row([
        ("enter", Value::Str("20171020T112238".into())),
        ("leave", Value::Str("20171020T112309".into())),
    ]);
    let out = Duration::new("enter", "leave", "dur").apply(r).unwrap();
    let hours = out[0].get("dur").unwrap().as_f64().unwrap();
    assert!((hours - 31.0 / 3600.0).abs() < 1e-9);
}

#[test]
fn str_to_int_parses_every_listed_column() {
    let r = row([("a", Value::Str("12".into())), ("b", Value::Str("-3".into()))]);
    let out = StrToInt::new(vec!["a".to_string(), "b".to_string()]).apply(r).unwrap();
    assert_eq!(out[0].get("a"), Some(&Value::Int(12)));
    assert_eq!(out[0].get("b"), Some(&Value::Int(-3)));
}

#[test]
fn top_n_with_ties_keeps_first_seen_order() {
    let group = vec![
        row([("k", Value::Int(1)), ("score", Value::Int(5))]),
        row([("k", Value::Int(1)), ("score", Value::Int(7))]),
        row([("k", Value::Int(1)), ("score", Value::Int(7))]),
        row([("k", Value::Int(1)), ("score", Value::Int(1))]),
    ];
    let out = TopN::new("score", 3).reduce(&["k".to_string()], group.clone()).unwrap();
    assert_eq!(out.len(), 3);
    assert_eq!(out[0], group[1]);
    assert_eq!(out[1], group[2]);
    assert_eq!(out[2], group[0]);
}
