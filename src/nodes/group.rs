use crate::error::GraphError;
use crate::row::{KeyTuple, Row};
use crate::stream::{ErrorGate, RowStream};

/// A maximal contiguous run of rows sharing one key value.
pub(crate) struct Group {
    pub key: KeyTuple,
    pub rows: Vec<Row>,
}

/// Walks a row stream, collecting it into maximal key-equal groups, the
/// discipline `reduce` and `join` both require of their input. Requires the
/// upstream to already be sorted by `keys` (or otherwise contiguous-grouped);
/// it does not sort.
pub(crate) struct GroupingCursor {
    gate: ErrorGate,
    keys: Vec<String>,
    pending: Option<Row>,
}

impl GroupingCursor {
    pub fn new(stream: RowStream, keys: Vec<String>) -> Self {
        let mut gate = ErrorGate::new(stream);
        let pending = gate.next();
        Self { gate, keys, pending }
    }

    /// Returns the next group, or `None` once the stream is exhausted. Any
    /// upstream error surfaces via `take_error` after this returns `None`.
    pub fn next_group(&mut self) -> Result<Option<Group>, GraphError> {
        let Some(first) = self.pending.take() else {
            return Ok(None);
        };
        let key = KeyTuple::of(&first, &self.keys);
        let mut rows = vec![first];
        loop {
            match self.gate.next() {
                Some(row) => {
                    let row_key = KeyTuple::of(&row, &self.keys);
                    if row_key.try_cmp(&key, &self.keys)? == std::cmp::Ordering::Equal {
                        rows.push(row);
                    } else {
                        self.pending = Some(row);
                        return Ok(Some(Group { key, rows }));
                    }
                }
                None => return Ok(Some(Group { key, rows })),
            }
        }
    }

    pub fn take_error(&mut self) -> Option<GraphError> {
        self.gate.take_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Value;

    fn row(k: i64) -> Row {
        Row::from([("k".to_string(), Value::Int(k))])
    }

    #[test]
    fn groups_contiguous_equal_keys() {
        let rows: Vec<Result<Row, GraphError>> =
            vec![Ok(row(1)), Ok(row(1)), Ok(row(2)), Ok(row(2)), Ok(row(2))];
        let mut cursor = GroupingCursor::new(Box::new(rows.into_iter()), vec!["k".to_string()]);

        let g1 = cursor.next_group().unwrap().unwrap();
        assert_eq!(g1.rows.len(), 2);
        let g2 = cursor.next_group().unwrap().unwrap();
        assert_eq!(g2.rows.len(), 3);
        assert!(cursor.next_group().unwrap().is_none());
        assert!(cursor.take_error().is_none());
    }

    #[test]
    fn groups_int_and_float_keys_as_one_numeric_family() {
        let mixed = vec![
            Row::from([("k".to_string(), Value::Int(1))]),
            Row::from([("k".to_string(), Value::Float(1.0))]),
            Row::from([("k".to_string(), Value::Int(2))]),
        ];
        let rows: Vec<Result<Row, GraphError>> = mixed.into_iter().map(Ok).collect();
        let mut cursor = GroupingCursor::new(Box::new(rows.into_iter()), vec!["k".to_string()]);

        let g1 = cursor.next_group().unwrap().unwrap();
        assert_eq!(g1.rows.len(), 2);
        let g2 = cursor.next_group().unwrap().unwrap();
        assert_eq!(g2.rows.len(), 1);
        assert!(cursor.next_group().unwrap().is_none());
    }

    #[test]
    fn surfaces_upstream_error_after_exhaustion() {
        let rows: Vec<Result<Row, GraphError>> = vec![Ok(row(1)), Err(GraphError::EmptyOperation)];
        let mut cursor = GroupingCursor::new(Box::new(rows.into_iter()), vec!["k".to_string()]);
        let g1 = cursor.next_group().unwrap().unwrap();
        assert_eq!(g1.rows.len(), 1);
        assert!(cursor.next_group().unwrap().is_none());
        assert!(matches!(cursor.take_error(), Some(GraphError::EmptyOperation)));
    }
}
