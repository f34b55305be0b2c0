use crate::error::GraphResult;
use crate::row::Row;

/// Reduces one maximal key-equal group to a finite sequence of output rows.
/// `keys` are the grouping column names; `group` is the full run (never
/// empty — groups are maximal non-empty by construction).
pub trait Reducer {
    fn reduce(&self, keys: &[String], group: Vec<Row>) -> GraphResult<Vec<Row>>;
}

/// Emits only the first row of the group, verbatim.
pub struct FirstReducer;

impl Reducer for FirstReducer {
    fn reduce(&self, _keys: &[String], group: Vec<Row>) -> GraphResult<Vec<Row>> {
        Ok(group.into_iter().take(1).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Value;

    fn row(k: i64, v: i64) -> Row {
        Row::from([("k".to_string(), Value::Int(k)), ("v".to_string(), Value::Int(v))])
    }

    #[test]
    fn first_reducer_keeps_only_first_row() {
        let group = vec![row(1, 10), row(1, 20)];
        let out = FirstReducer.reduce(&["k".to_string()], group).unwrap();
        assert_eq!(out, vec![row(1, 10)]);
    }
}
