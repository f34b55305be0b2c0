use std::fs::File;
use std::io::{BufRead, BufReader};
use std::rc::Rc;

use crate::error::GraphError;
use crate::row::Row;
use crate::stream::RowStream;

/// A zero-argument producer of a fresh row stream, looked up by name at
/// `run` time. Infallible because it is expected to wrap in-memory data;
/// a producer that needs to fail should do so lazily inside its iterator.
pub type Producer = Rc<dyn Fn() -> Box<dyn Iterator<Item = Row>>>;

pub(crate) fn from_iter(producer: Producer) -> RowStream {
    Box::new(producer().map(Ok))
}

/// Opens `path`, reads one logical record per line, and emits `parser(line)`
/// per line. Once a parse or I/O error occurs the stream stops (sticky
/// failure, matching the engine-wide "any error terminates the stream" rule).
pub(crate) fn from_file(
    path: impl Into<std::path::PathBuf>,
    parser: Rc<dyn Fn(&str) -> Result<Row, GraphError>>,
) -> Result<RowStream, GraphError> {
    let file = File::open(path.into())?;
    let lines = BufReader::new(file).lines();
    let mut halted = false;
    Ok(Box::new(lines.filter_map(move |line| {
        if halted {
            return None;
        }
        let result = match line {
            Ok(line) => parser(&line),
            Err(e) => Err(GraphError::Io(e)),
        };
        if result.is_err() {
            halted = true;
        }
        Some(result)
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::Value;

    #[test]
    fn from_iter_reemits_rows_unchanged() {
        let rows = vec![Row::from([("a".to_string(), Value::Int(1))])];
        let producer: Producer = Rc::new(move || Box::new(rows.clone().into_iter()));
        let out: Vec<_> = from_iter(producer).collect::<Result<_, _>>().unwrap();
        assert_eq!(out.len(), 1);
    }
}
