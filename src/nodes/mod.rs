//! Row-stream operators. Each submodule exposes a `pub(crate) fn run(...) -> RowStream`
//! built on a hand-rolled `Iterator` adapter; `graph.rs` dispatches to these when
//! evaluating a plan.

mod group;
mod join;
mod map;
mod reduce;
mod sort;
mod source;

pub(crate) use group::{Group, GroupingCursor};
pub(crate) use join::run as run_join;
pub(crate) use map::run as run_map;
pub(crate) use reduce::run as run_reduce;
pub(crate) use sort::{run as run_sort, DEFAULT_MEMORY_LIMIT};
pub(crate) use source::{from_file, from_iter, Producer};
