use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::{GraphError, GraphResult};
use crate::reducer::Reducer;
use crate::row::{Row, Value};

fn key_columns(keys: &[String], sample: &Row) -> Row {
    keys.iter()
        .filter_map(|k| sample.get(k).map(|v| (k.clone(), v.clone())))
        .collect()
}

/// Emits one row per group: the group's key columns plus `result_col` set to
/// the group's row count.
pub struct Count {
    pub result_col: String,
}

impl Count {
    pub fn new(result_col: impl Into<String>) -> Self {
        Self { result_col: result_col.into() }
    }
}

impl Reducer for Count {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> GraphResult<Vec<Row>> {
        let mut out = key_columns(keys, &group[0]);
        out.insert(self.result_col.clone(), Value::Int(group.len() as i64));
        Ok(vec![out])
    }
}

/// Emits one row per group: the group's key columns plus `col` summed.
/// Writes key values from the group's first row — valid because every row
/// in a group shares the key by construction.
pub struct Sum {
    pub col: String,
}

impl Sum {
    pub fn new(col: impl Into<String>) -> Self {
        Self { col: col.into() }
    }
}

impl Reducer for Sum {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> GraphResult<Vec<Row>> {
        let mut total = 0.0;
        let mut is_int = true;
        for row in &group {
            let v = row
                .get(&self.col)
                .ok_or_else(|| GraphError::MissingColumn(self.col.clone()))?;
            match v {
                Value::Int(i) => total += *i as f64,
                Value::Float(f) => {
                    is_int = false;
                    total += f;
                }
                other => {
                    return Err(GraphError::Parse(format!(
                        "cannot sum non-numeric value {other:?} in column {}",
                        self.col
                    )));
                }
            }
        }
        let mut out = key_columns(keys, &group[0]);
        let summed = if is_int { Value::Int(total as i64) } else { Value::Float(total) };
        out.insert(self.col.clone(), summed);
        Ok(vec![out])
    }
}

/// For each distinct value of `words_col` in the group, emits a row with the
/// group's key values, `words_col = value`, and `result_col = occurrences /
/// group_size`.
pub struct TermFrequency {
    pub words_col: String,
    pub result_col: String,
}

impl TermFrequency {
    pub fn new(words_col: impl Into<String>) -> Self {
        Self { words_col: words_col.into(), result_col: "tf".into() }
    }

    pub fn with_result_col(words_col: impl Into<String>, result_col: impl Into<String>) -> Self {
        Self { words_col: words_col.into(), result_col: result_col.into() }
    }
}

impl Reducer for TermFrequency {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> GraphResult<Vec<Row>> {
        let total = group.len() as f64;
        // Value isn't Hash/Eq (it carries f64), so tally by rendered string
        // and keep one sample Value per distinct rendering for the output row.
        let mut ordered: Vec<Value> = Vec::new();
        let mut tallies: HashMap<String, i64> = HashMap::new();
        for row in &group {
            let v = row
                .get(&self.words_col)
                .ok_or_else(|| GraphError::MissingColumn(self.words_col.clone()))?;
            let rendered = format!("{v:?}");
            if !tallies.contains_key(&rendered) {
                ordered.push(v.clone());
            }
            *tallies.entry(rendered).or_insert(0) += 1;
        }

        let base = key_columns(keys, &group[0]);
        let mut out = Vec::with_capacity(ordered.len());
        for v in ordered {
            let rendered = format!("{v:?}");
            let occurrences = tallies[&rendered];
            let mut row = base.clone();
            row.insert(self.words_col.clone(), v);
            row.insert(self.result_col.clone(), Value::Float(occurrences as f64 / total));
            out.push(row);
        }
        Ok(out)
    }
}

/// Emits the `n` rows of the group with the largest values of `col`, in
/// descending order, ties broken by first-seen (stable).
pub struct TopN {
    pub col: String,
    pub n: usize,
}

impl TopN {
    pub fn new(col: impl Into<String>, n: usize) -> Self {
        Self { col: col.into(), n }
    }
}

impl Reducer for TopN {
    fn reduce(&self, _keys: &[String], mut group: Vec<Row>) -> GraphResult<Vec<Row>> {
        let mut err = None;
        group.sort_by(|a, b| {
            let ord = a
                .get(&self.col)
                .zip(b.get(&self.col))
                .and_then(|(x, y)| y.as_f64().zip(x.as_f64()))
                .map(|(y, x)| y.partial_cmp(&x).unwrap_or(Ordering::Equal));
            ord.unwrap_or_else(|| {
                err.get_or_insert(GraphError::MissingColumn(self.col.clone()));
                Ordering::Equal
            })
        });
        if let Some(e) = err {
            return Err(e);
        }
        group.truncate(self.n);
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(k: i64, s: i64) -> Row {
        Row::from([("k".to_string(), Value::Int(k)), ("s".to_string(), Value::Int(s))])
    }

    #[test]
    fn count_emits_group_cardinality() {
        let group = vec![row(1, 10), row(1, 20), row(1, 30)];
        let out = Count::new("count").reduce(&["k".to_string()], group).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("count"), Some(&Value::Int(3)));
        assert_eq!(out[0].get("k"), Some(&Value::Int(1)));
    }

    #[test]
    fn sum_adds_column_across_group() {
        let group = vec![row(1, 2), row(1, 3)];
        let out = Sum::new("s").reduce(&["k".to_string()], group).unwrap();
        assert_eq!(out[0].get("s"), Some(&Value::Int(5)));
    }

    #[test]
    fn top_n_breaks_ties_by_first_seen() {
        let group = vec![row(1, 5), row(1, 5), row(1, 3)];
        let out = TopN::new("s", 2).reduce(&["k".to_string()], group).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.get("s") == Some(&Value::Int(5))));
    }

    #[test]
    fn term_frequency_divides_by_group_size() {
        let group = vec![
            Row::from([("k".to_string(), Value::Int(1)), ("w".to_string(), Value::Str("a".into()))]),
            Row::from([("k".to_string(), Value::Int(1)), ("w".to_string(), Value::Str("a".into()))]),
            Row::from([("k".to_string(), Value::Int(1)), ("w".to_string(), Value::Str("b".into()))]),
        ];
        let out = TermFrequency::new("w").reduce(&["k".to_string()], group).unwrap();
        assert_eq!(out.len(), 2);
        let a = out.iter().find(|r| r.get("w") == Some(&Value::Str("a".into()))).unwrap();
        assert_eq!(a.get("tf"), Some(&Value::Float(2.0 / 3.0)));
    }
}
