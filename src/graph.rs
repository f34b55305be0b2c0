use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{GraphError, GraphResult};
use crate::joiner::Joiner;
use crate::mapper::Mapper;
use crate::nodes::{self, Producer};
use crate::reducer::Reducer;
use crate::row::Row;
use crate::stream::RowStream;

/// A fallible `Row`-line parser for file-backed sources, e.g. a JSON-lines decoder.
pub type Parser = Rc<dyn Fn(&str) -> Result<Row, GraphError>>;

/// Producers bound to a graph at `run` time, keyed by the name given to
/// `Graph::from_iter`. Lets a plan be built once and re-run against different
/// concrete data.
pub type NamedSources = HashMap<String, Producer>;

enum Op {
    FromIter(String),
    FromFile(std::path::PathBuf, Parser),
    Map(Rc<dyn Mapper>),
    Reduce(Rc<dyn Reducer>, Vec<String>),
    Sort(Vec<String>, usize),
    Join(Rc<dyn Joiner>, Vec<String>),
}

/// A node in an immutable plan tree. Graphs are built by composing operators
/// on top of a source and are only evaluated, lazily, when `run` is called;
/// building a graph never touches a source.
pub struct Graph {
    op: Option<Op>,
    upstreams: Vec<Rc<Graph>>,
}

impl Graph {
    /// A source that looks up a named producer in the `NamedSources` map
    /// passed to `run`. Building the graph does not require the producer to
    /// exist yet; `run` fails with `UnboundSource` if it's still missing.
    pub fn from_iter(name: impl Into<String>) -> Rc<Graph> {
        Rc::new(Graph { op: Some(Op::FromIter(name.into())), upstreams: Vec::new() })
    }

    /// A source that reads `path` line by line, applying `parser` to each line.
    pub fn from_file(path: impl Into<std::path::PathBuf>, parser: Parser) -> Rc<Graph> {
        Rc::new(Graph { op: Some(Op::FromFile(path.into(), parser)), upstreams: Vec::new() })
    }

    pub fn map(self: &Rc<Self>, mapper: impl Mapper + 'static) -> Rc<Graph> {
        Rc::new(Graph { op: Some(Op::Map(Rc::new(mapper))), upstreams: vec![self.clone()] })
    }

    pub fn reduce(self: &Rc<Self>, reducer: impl Reducer + 'static, keys: impl Into<Vec<String>>) -> Rc<Graph> {
        Rc::new(Graph {
            op: Some(Op::Reduce(Rc::new(reducer), keys.into())),
            upstreams: vec![self.clone()],
        })
    }

    /// Sorts by `keys`, spilling to disk only past `nodes::DEFAULT_MEMORY_LIMIT` rows.
    pub fn sort(self: &Rc<Self>, keys: impl Into<Vec<String>>) -> Rc<Graph> {
        self.sort_with_limit(keys, nodes::DEFAULT_MEMORY_LIMIT)
    }

    /// Sorts by `keys`, spilling a run to a temporary file once it reaches `limit` rows.
    pub fn sort_with_limit(self: &Rc<Self>, keys: impl Into<Vec<String>>, limit: usize) -> Rc<Graph> {
        Rc::new(Graph { op: Some(Op::Sort(keys.into(), limit)), upstreams: vec![self.clone()] })
    }

    /// Sorted-merge joins `self` (left) with `other` (right) on `keys`. Both
    /// sides must already be grouped by `keys` (typically via `.sort(keys)`).
    pub fn join(self: &Rc<Self>, other: &Rc<Graph>, joiner: impl Joiner + 'static, keys: impl Into<Vec<String>>) -> Rc<Graph> {
        Rc::new(Graph {
            op: Some(Op::Join(Rc::new(joiner), keys.into())),
            upstreams: vec![self.clone(), other.clone()],
        })
    }

    /// Evaluates the plan against `sources`, returning the resulting row
    /// stream. Nothing upstream is touched until this is called, and nothing
    /// is buffered beyond what each operator individually requires (sort and
    /// the grouped side of a join still need to see a full group or run).
    pub fn run(self: &Rc<Self>, sources: &NamedSources) -> GraphResult<RowStream> {
        let op = self.op.as_ref().ok_or(GraphError::EmptyOperation)?;
        match op {
            Op::FromIter(name) => {
                let producer = sources.get(name).ok_or_else(|| GraphError::UnboundSource(name.clone()))?;
                Ok(nodes::from_iter(producer.clone()))
            }
            Op::FromFile(path, parser) => nodes::from_file(path.clone(), parser.clone()),
            Op::Map(mapper) => {
                let upstream = self.upstreams[0].run(sources)?;
                Ok(nodes::run_map(upstream, mapper.clone()))
            }
            Op::Reduce(reducer, keys) => {
                let upstream = self.upstreams[0].run(sources)?;
                Ok(nodes::run_reduce(upstream, reducer.clone(), keys.clone()))
            }
            Op::Sort(keys, limit) => {
                let upstream = self.upstreams[0].run(sources)?;
                Ok(nodes::run_sort(upstream, keys.clone(), *limit))
            }
            Op::Join(joiner, keys) => {
                let left = self.upstreams[0].run(sources)?;
                let right = self.upstreams[1].run(sources)?;
                Ok(nodes::run_join(left, right, joiner.clone(), keys.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::DummyMapper;
    use crate::reducers::Count;
    use crate::row::Value;

    fn source(rows: Vec<Row>) -> Producer {
        Rc::new(move || Box::new(rows.clone().into_iter()))
    }

    #[test]
    fn run_fails_on_unbound_source() {
        let graph = Graph::from_iter("missing");
        let sources = NamedSources::new();
        assert!(matches!(graph.run(&sources).unwrap_err(), GraphError::UnboundSource(_)));
    }

    #[test]
    fn map_then_reduce_produces_grouped_counts() {
        let rows = vec![
            Row::from([("k".to_string(), Value::Int(1))]),
            Row::from([("k".to_string(), Value::Int(1))]),
            Row::from([("k".to_string(), Value::Int(2))]),
        ];
        let mut sources = NamedSources::new();
        sources.insert("input".to_string(), source(rows));

        let graph = Graph::from_iter("input")
            .map(DummyMapper)
            .sort(vec!["k".to_string()])
            .reduce(Count::new("n"), vec!["k".to_string()]);

        let out: Vec<_> = graph.run(&sources).unwrap().collect::<Result<_, _>>().unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("n"), Some(&Value::Int(2)));
        assert_eq!(out[1].get("n"), Some(&Value::Int(1)));
    }

    #[test]
    fn run_without_operation_is_empty_operation_error() {
        let graph = Rc::new(Graph { op: None, upstreams: Vec::new() });
        let sources = NamedSources::new();
        assert!(matches!(graph.run(&sources).unwrap_err(), GraphError::EmptyOperation));
    }
}
