use std::cmp::Ordering;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::joiner::Joiner;
use crate::nodes::group::{Group, GroupingCursor};
use crate::stream::{RowResult, RowStream};

/// Co-walks two key-sorted, key-grouped streams, delegating each encountered
/// pair of (possibly empty) groups to `joiner`.
struct JoinStream {
    left: GroupingCursor,
    right: GroupingCursor,
    joiner: Rc<dyn Joiner>,
    keys: Vec<String>,
    buffered: VecDeque<RowResult>,
    left_group: Option<Group>,
    right_group: Option<Group>,
    started: bool,
    done: bool,
}

impl JoinStream {
    fn emit(&mut self, left: &[crate::row::Row], right: &[crate::row::Row]) {
        match self.joiner.join(&self.keys, left, right) {
            Ok(rows) => self.buffered.extend(rows.into_iter().map(Ok)),
            Err(e) => {
                self.buffered.push_back(Err(e));
                self.done = true;
            }
        }
    }

    fn step(&mut self) {
        if !self.started {
            self.started = true;
            self.left_group = self.pull_group(true);
            self.right_group = self.pull_group(false);
        }

        match (&self.left_group, &self.right_group) {
            (Some(l), Some(r)) => match l.key.try_cmp(&r.key, &self.keys) {
                Ok(Ordering::Equal) => {
                    let (l, r) = (self.left_group.take().unwrap(), self.right_group.take().unwrap());
                    self.emit(&l.rows, &r.rows);
                    self.left_group = self.pull_group(true);
                    self.right_group = self.pull_group(false);
                }
                Ok(Ordering::Less) => {
                    let l = self.left_group.take().unwrap();
                    self.emit(&l.rows, &[]);
                    self.left_group = self.pull_group(true);
                }
                Ok(Ordering::Greater) => {
                    let r = self.right_group.take().unwrap();
                    self.emit(&[], &r.rows);
                    self.right_group = self.pull_group(false);
                }
                Err(e) => {
                    self.buffered.push_back(Err(e));
                    self.done = true;
                }
            },
            (Some(_), None) => {
                let l = self.left_group.take().unwrap();
                self.emit(&l.rows, &[]);
                self.left_group = self.pull_group(true);
            }
            (None, Some(_)) => {
                let r = self.right_group.take().unwrap();
                self.emit(&[], &r.rows);
                self.right_group = self.pull_group(false);
            }
            (None, None) => {
                if let Some(e) = self.left.take_error() {
                    self.buffered.push_back(Err(e));
                }
                if let Some(e) = self.right.take_error() {
                    self.buffered.push_back(Err(e));
                }
                self.done = true;
            }
        }
    }

    fn pull_group(&mut self, left: bool) -> Option<Group> {
        let cursor = if left { &mut self.left } else { &mut self.right };
        match cursor.next_group() {
            Ok(group) => group,
            Err(e) => {
                self.buffered.push_back(Err(e));
                self.done = true;
                None
            }
        }
    }
}

impl Iterator for JoinStream {
    type Item = RowResult;

    fn next(&mut self) -> Option<RowResult> {
        loop {
            if let Some(item) = self.buffered.pop_front() {
                return Some(item);
            }
            if self.done {
                return None;
            }
            self.step();
        }
    }
}

pub(crate) fn run(left: RowStream, right: RowStream, joiner: Rc<dyn Joiner>, keys: Vec<String>) -> RowStream {
    Box::new(JoinStream {
        left: GroupingCursor::new(left, keys.clone()),
        right: GroupingCursor::new(right, keys.clone()),
        joiner,
        keys,
        buffered: VecDeque::new(),
        left_group: None,
        right_group: None,
        started: false,
        done: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joiners::InnerJoiner;
    use crate::row::{Row, Value};

    fn row(id: i64, v: &str) -> RowResult {
        Ok(Row::from([("id".to_string(), Value::Int(id)), ("v".to_string(), Value::Str(v.into()))]))
    }

    #[test]
    fn inner_join_matches_groups_in_ascending_key_order() {
        let left = vec![row(1, "a"), row(2, "b")];
        let right = vec![row(1, "x"), row(1, "y"), row(3, "z")];
        let out: Vec<_> = run(
            Box::new(left.into_iter()),
            Box::new(right.into_iter()),
            Rc::new(InnerJoiner::new()),
            vec!["id".to_string()],
        )
        .collect::<Result<_, _>>()
        .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].get("v_1"), Some(&Value::Str("a".into())));
        assert_eq!(out[0].get("v_2"), Some(&Value::Str("x".into())));
        assert_eq!(out[1].get("v_2"), Some(&Value::Str("y".into())));
    }
}
