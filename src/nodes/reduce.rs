use std::collections::VecDeque;
use std::rc::Rc;

use crate::nodes::group::GroupingCursor;
use crate::reducer::Reducer;
use crate::stream::{RowResult, RowStream};

/// Groups the (assumed key-sorted) upstream into maximal key-equal runs and
/// invokes `reducer` once per group, concatenating its outputs.
struct ReduceStream {
    cursor: GroupingCursor,
    reducer: Rc<dyn Reducer>,
    keys: Vec<String>,
    buffered: VecDeque<RowResult>,
    done: bool,
}

impl Iterator for ReduceStream {
    type Item = RowResult;

    fn next(&mut self) -> Option<RowResult> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(item);
            }
            if self.done {
                return None;
            }
            match self.cursor.next_group() {
                Ok(Some(group)) => match self.reducer.reduce(&self.keys, group.rows) {
                    Ok(rows) => self.buffered.extend(rows.into_iter().map(Ok)),
                    Err(e) => {
                        self.buffered.push_back(Err(e));
                        self.done = true;
                    }
                },
                Ok(None) => {
                    if let Some(e) = self.cursor.take_error() {
                        self.buffered.push_back(Err(e));
                    }
                    self.done = true;
                }
                Err(e) => {
                    self.buffered.push_back(Err(e));
                    self.done = true;
                }
            }
        }
    }
}

pub(crate) fn run(upstream: RowStream, reducer: Rc<dyn Reducer>, keys: Vec<String>) -> RowStream {
    Box::new(ReduceStream {
        cursor: GroupingCursor::new(upstream, keys.clone()),
        reducer,
        keys,
        buffered: VecDeque::new(),
        done: false,
    })
}
