//! JSON-lines row I/O: one row object per line, the convention used by both
//! `from_file` sources and the CLI binaries' stdout.

use serde_json::Value as JsonValue;

use crate::error::{GraphError, GraphResult};
use crate::row::{Row, Value};

fn from_json_value(value: JsonValue) -> GraphResult<Value> {
    match value {
        JsonValue::Number(n) if n.is_i64() => Ok(Value::Int(n.as_i64().unwrap())),
        JsonValue::Number(n) => n
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| GraphError::Parse(format!("unrepresentable number: {n}"))),
        JsonValue::String(s) => Ok(Value::Str(s)),
        JsonValue::Array(items) => {
            let floats = items
                .iter()
                .map(|v| v.as_f64().ok_or_else(|| GraphError::Parse(format!("non-numeric array element: {v}"))))
                .collect::<GraphResult<Vec<f64>>>()?;
            Ok(Value::Point(floats))
        }
        other => Err(GraphError::Parse(format!("unsupported JSON value: {other}"))),
    }
}

fn to_json_value(value: &Value) -> JsonValue {
    match value {
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => JsonValue::from(*f),
        Value::Str(s) => JsonValue::from(s.clone()),
        Value::Point(p) => JsonValue::from(p.clone()),
    }
}

/// Parses one JSON object per line into a [`Row`]. Used as a `Parser` for
/// `Graph::from_file`.
pub fn json_parser(line: &str) -> GraphResult<Row> {
    let object: serde_json::Map<String, JsonValue> =
        serde_json::from_str(line).map_err(|e| GraphError::Parse(format!("invalid JSON row: {e}")))?;
    object
        .into_iter()
        .map(|(k, v)| from_json_value(v).map(|v| (k, v)))
        .collect()
}

/// Renders a [`Row`] as a single JSON-object line, matching `json_parser`'s
/// input format.
pub fn row_to_json(row: &Row) -> String {
    let object: serde_json::Map<String, JsonValue> =
        row.iter().map(|(k, v)| (k.clone(), to_json_value(v))).collect();
    JsonValue::Object(object).to_string()
}
