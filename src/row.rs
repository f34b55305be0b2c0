use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// A single cell value. Rows are heterogeneous: different rows of the same
/// stream may hold different variants under the same column name, and the
/// engine never validates this — only key comparison cares about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    /// A sequence of numbers, used for coordinate pairs ([lon, lat]).
    Point(Vec<f64>),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Natural order within one variant, with Int/Float treated as a single
    /// numeric domain. `None` means the two values cannot be ordered against
    /// each other (a genuine type mismatch within a key column).
    fn natural_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Float(_) | Value::Int(_), Value::Float(_) | Value::Int(_)) => {
                self.as_f64().unwrap().partial_cmp(&other.as_f64().unwrap())
            }
            (Value::Point(a), Value::Point(b)) => {
                let len_cmp = a.len().cmp(&b.len());
                if len_cmp != Ordering::Equal {
                    return Some(len_cmp);
                }
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.partial_cmp(y) {
                        Some(Ordering::Equal) => continue,
                        other => return other,
                    }
                }
                Some(Ordering::Equal)
            }
            _ => None,
        }
    }
}

/// A row is an unordered column-name -> value mapping.
pub type Row = HashMap<String, Value>;

/// An ordered list of column names used to group, sort or join rows.
pub type Keys = Vec<String>;

/// The value of a row under a key tuple. Missing columns become `None`,
/// a distinct "absent" value per the key-comparison contract: absent sorts
/// before every present value and compares equal only to another absent.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTuple(pub Vec<Option<Value>>);

impl KeyTuple {
    pub fn of(row: &Row, keys: &[String]) -> KeyTuple {
        KeyTuple(keys.iter().map(|k| row.get(k).cloned()).collect())
    }

    /// Fallible element-wise comparison. Absent values are least; two present
    /// values of incompatible variants are a user error, not silently ordered.
    pub fn try_cmp(&self, other: &KeyTuple, keys: &[String]) -> Result<Ordering, GraphError> {
        for (i, (a, b)) in self.0.iter().zip(other.0.iter()).enumerate() {
            let ord = match (a, b) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(a), Some(b)) => a.natural_cmp(b).ok_or_else(|| {
                    GraphError::IncompatibleKeyTypes {
                        column: keys.get(i).cloned().unwrap_or_default(),
                    }
                })?,
            };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(Ordering::Equal)
    }
}

/// Checks that every row agrees on the variant carried by each key column,
/// so that subsequent comparisons during a sort or merge can never hit a
/// type mismatch. Run once up front rather than threading `Result` through
/// every comparator call (`Ord`/`sort_by` require an infallible comparator).
pub fn validate_homogeneous_keys(rows: &[Row], keys: &[String]) -> Result<(), GraphError> {
    let mut representative: Vec<Option<&Value>> = vec![None; keys.len()];
    for row in rows {
        for (i, key) in keys.iter().enumerate() {
            let Some(value) = row.get(key) else { continue };
            match representative[i] {
                None => representative[i] = Some(value),
                Some(seen) if seen.natural_cmp(value).is_some() => {}
                Some(_) => {
                    return Err(GraphError::IncompatibleKeyTypes { column: key.clone() });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn key_tuple_orders_absent_before_present() {
        let keys = vec!["k".to_string()];
        let present = KeyTuple::of(&row(&[("k", Value::Int(1))]), &keys);
        let absent = KeyTuple::of(&row(&[]), &keys);
        assert_eq!(absent.try_cmp(&present, &keys).unwrap(), Ordering::Less);
        assert_eq!(present.try_cmp(&absent, &keys).unwrap(), Ordering::Greater);
    }

    #[test]
    fn int_and_float_compare_numerically() {
        let keys = vec!["k".to_string()];
        let a = KeyTuple::of(&row(&[("k", Value::Int(2))]), &keys);
        let b = KeyTuple::of(&row(&[("k", Value::Float(2.5))]), &keys);
        assert_eq!(a.try_cmp(&b, &keys).unwrap(), Ordering::Less);
    }

    #[test]
    fn mismatched_variants_reject() {
        let keys = vec!["k".to_string()];
        let a = KeyTuple::of(&row(&[("k", Value::Int(1))]), &keys);
        let b = KeyTuple::of(&row(&[("k", Value::Str("x".into()))]), &keys);
        assert!(matches!(
            a.try_cmp(&b, &keys),
            Err(GraphError::IncompatibleKeyTypes { .. })
        ));
    }

    #[test]
    fn validate_homogeneous_keys_catches_cross_row_mismatch() {
        let keys = vec!["k".to_string()];
        let rows = vec![row(&[("k", Value::Int(1))]), row(&[("k", Value::Str("x".into()))])];
        assert!(validate_homogeneous_keys(&rows, &keys).is_err());
    }
}
