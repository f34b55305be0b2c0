use crate::error::GraphError;
use crate::row::Row;

pub type RowResult = Result<Row, GraphError>;

/// A lazy, single-pass, finite sequence of rows. Every operator consumes and
/// produces this type; it is the one point where the engine's internal
/// fallibility (I/O, user-function errors) is visible to callers.
pub type RowStream = Box<dyn Iterator<Item = RowResult>>;

/// Adapts a fallible row stream into an infallible `Iterator<Item = Row>`,
/// remembering the first error seen so the caller can replay it once done.
/// Lets grouping/sorting code work with plain `Row`s instead of threading
/// `Result` through every comparison.
pub(crate) struct ErrorGate {
    inner: RowStream,
    error: Option<GraphError>,
    halted: bool,
}

impl ErrorGate {
    pub fn new(inner: RowStream) -> Self {
        Self { inner, error: None, halted: false }
    }

    pub fn take_error(&mut self) -> Option<GraphError> {
        self.error.take()
    }
}

impl Iterator for ErrorGate {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.halted {
            return None;
        }
        match self.inner.next() {
            Some(Ok(row)) => Some(row),
            Some(Err(e)) => {
                self.error = Some(e);
                self.halted = true;
                None
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Value;

    #[test]
    fn error_gate_halts_on_first_error() {
        let items: Vec<RowResult> = vec![
            Ok(Row::from([("a".to_string(), Value::Int(1))])),
            Err(GraphError::EmptyOperation),
            Ok(Row::from([("a".to_string(), Value::Int(2))])),
        ];
        let mut gate = ErrorGate::new(Box::new(items.into_iter()));
        assert!(gate.next().is_some());
        assert!(gate.next().is_none());
        assert!(matches!(gate.take_error(), Some(GraphError::EmptyOperation)));
        assert!(gate.next().is_none());
    }
}
