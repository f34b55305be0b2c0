//! A computational graph library for tabular row streams: a pull-based,
//! single-threaded, single-pass MapReduce-style dataflow engine.
//!
//! A [`Graph`] is an immutable plan tree built by composing six operators —
//! `from_iter`, `from_file`, `map`, `reduce`, `sort`, `join` — on top of a
//! source. Nothing runs until [`Graph::run`] is called; building a plan never
//! touches a source, and a plan can be `run` more than once against different
//! bound sources.
//!
//! ```
//! use std::rc::Rc;
//! use compgraph::{Graph, NamedSources};
//! use compgraph::reducers::Count;
//! use compgraph::{Row, Value};
//!
//! let mut sources = NamedSources::new();
//! let rows = vec![
//!     Row::from([("word".to_string(), Value::Str("a".into()))]),
//!     Row::from([("word".to_string(), Value::Str("a".into()))]),
//!     Row::from([("word".to_string(), Value::Str("b".into()))]),
//! ];
//! sources.insert("input".to_string(), Rc::new(move || Box::new(rows.clone().into_iter())));
//!
//! let graph = Graph::from_iter("input")
//!     .sort(vec!["word".to_string()])
//!     .reduce(Count::new("count"), vec!["word".to_string()]);
//!
//! let out: Result<Vec<_>, _> = graph.run(&sources).unwrap().collect();
//! assert_eq!(out.unwrap().len(), 2);
//! ```

mod error;
mod graph;
mod joiner;
mod mapper;
mod nodes;
mod reducer;
mod row;
mod stream;

pub mod algorithms;
pub mod joiners;
pub mod json;
pub mod mappers;
pub mod reducers;

pub use error::{GraphError, GraphResult};
pub use graph::{Graph, NamedSources, Parser};
pub use joiner::Joiner;
pub use mapper::{DummyMapper, FnMapper, Mapper};
pub use reducer::{FirstReducer, Reducer};
pub use row::{KeyTuple, Keys, Row, Value};
pub use stream::{RowResult, RowStream};
