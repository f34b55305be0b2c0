use std::rc::Rc;

use crate::mapper::Mapper;
use crate::stream::{RowResult, RowStream};

/// For each upstream row, invokes `mapper` and flattens its output rows back
/// into the stream. An upstream error is passed straight through without
/// invoking the mapper.
pub(crate) fn run(upstream: RowStream, mapper: Rc<dyn Mapper>) -> RowStream {
    Box::new(upstream.flat_map(move |item| -> Vec<RowResult> {
        match item {
            Ok(row) => match mapper.apply(row) {
                Ok(rows) => rows.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            },
            Err(e) => vec![Err(e)],
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::DummyMapper;
    use crate::row::{Row, Value};

    #[test]
    fn map_applies_mapper_to_every_row() {
        let rows: Vec<RowResult> = vec![Ok(Row::from([("a".to_string(), Value::Int(1))]))];
        let out: Vec<_> = run(Box::new(rows.into_iter()), Rc::new(DummyMapper))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(out.len(), 1);
    }
}
