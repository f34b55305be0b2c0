use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::rc::Rc;

use crate::error::{GraphError, GraphResult};
use crate::row::{validate_homogeneous_keys, KeyTuple, Row};
use crate::stream::{RowResult, RowStream};

/// One sorted segment feeding the k-way merge: either the tail buffer kept
/// in memory (the common case, when nothing ever spilled), or a run already
/// written out to and read back from a temporary file.
enum RunSource {
    Memory(std::vec::IntoIter<Row>),
    File(std::io::Lines<BufReader<File>>),
}

struct Run {
    source: RunSource,
}

impl Run {
    fn next_row(&mut self) -> GraphResult<Option<Row>> {
        match &mut self.source {
            RunSource::Memory(it) => Ok(it.next()),
            RunSource::File(lines) => match lines.next() {
                Some(Ok(line)) => serde_json::from_str(&line)
                    .map(Some)
                    .map_err(|e| GraphError::Parse(format!("corrupt sort spill run: {e}"))),
                Some(Err(e)) => Err(GraphError::Io(e)),
                None => Ok(None),
            },
        }
    }
}

fn sort_buffer(buffer: &mut [Row], keys: &[String]) -> GraphResult<()> {
    validate_homogeneous_keys(buffer, keys)?;
    // Homogeneity is now guaranteed within this buffer, so `unwrap_or` below
    // is just a defensive fallback, not a silent swallow of a real mismatch.
    buffer.sort_by(|a, b| {
        KeyTuple::of(a, keys)
            .try_cmp(&KeyTuple::of(b, keys), keys)
            .unwrap_or(Ordering::Equal)
    });
    Ok(())
}

/// Sorts `buffer` and spills it to an anonymous temporary file, one JSON row
/// per line. The file has no path entry in any directory; once its handle
/// drops, the OS reclaims the space, which is what gives external sort its
/// "release spill files on stream drop/exhaustion" behavior for free.
fn spill(mut buffer: Vec<Row>, keys: &[String]) -> GraphResult<Run> {
    sort_buffer(&mut buffer, keys)?;
    log::debug!("sort: spilling run of {} rows to disk", buffer.len());
    let mut file = tempfile::tempfile()?;
    for row in &buffer {
        serde_json::to_writer(&mut file, row).map_err(|e| GraphError::Parse(e.to_string()))?;
        file.write_all(b"\n")?;
    }
    file.seek(SeekFrom::Start(0))?;
    Ok(Run { source: RunSource::File(BufReader::new(file).lines()) })
}

/// A run's current head row, ordered for use in a min-heap: `Ord` is the
/// reverse of the row's natural key order (ties broken by the lowest run id,
/// i.e. the run written first), so `BinaryHeap::pop` yields rows in sorted
/// order with earliest-run stability on key ties.
struct HeapEntry {
    key: KeyTuple,
    run_id: usize,
    row: Row,
    keys: Rc<Vec<String>>,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.run_id == other.run_id
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.key.try_cmp(&self.key, &self.keys).unwrap_or(Ordering::Equal) {
            Ordering::Equal => other.run_id.cmp(&self.run_id),
            ord => ord,
        }
    }
}

struct MergeState {
    heap: BinaryHeap<HeapEntry>,
    runs: Vec<Run>,
}

fn build_runs(upstream: RowStream, keys: &Rc<Vec<String>>, limit: usize) -> GraphResult<MergeState> {
    let mut runs = Vec::new();
    let mut buffer = Vec::new();
    for item in upstream {
        buffer.push(item?);
        if buffer.len() >= limit {
            let full = std::mem::take(&mut buffer);
            runs.push(spill(full, keys)?);
        }
    }
    if !buffer.is_empty() || runs.is_empty() {
        sort_buffer(&mut buffer, keys)?;
        runs.push(Run { source: RunSource::Memory(buffer.into_iter()) });
    }

    let mut heap = BinaryHeap::new();
    for (run_id, run) in runs.iter_mut().enumerate() {
        if let Some(row) = run.next_row()? {
            let key = KeyTuple::of(&row, keys);
            heap.push(HeapEntry { key, run_id, row, keys: keys.clone() });
        }
    }
    Ok(MergeState { heap, runs })
}

/// Buffers the upstream into runs of at most `limit` rows apiece, spilling
/// each full run to disk and sorting the final partial run in memory, then
/// k-way merges every run through a min-heap. Building the runs is eager
/// (it must see the whole upstream, and an error anywhere aborts the whole
/// sort) but deferred to first poll, so an unused sort never touches its
/// upstream at all.
struct SortStream {
    upstream: Option<RowStream>,
    keys: Rc<Vec<String>>,
    limit: usize,
    merge: Option<MergeState>,
    done: bool,
}

impl SortStream {
    fn ensure_built(&mut self) -> Option<GraphError> {
        if self.merge.is_some() || self.done {
            return None;
        }
        let upstream = self.upstream.take().expect("built at most once");
        match build_runs(upstream, &self.keys, self.limit) {
            Ok(merge) => {
                self.merge = Some(merge);
                None
            }
            Err(e) => {
                self.done = true;
                Some(e)
            }
        }
    }
}

impl Iterator for SortStream {
    type Item = RowResult;

    fn next(&mut self) -> Option<RowResult> {
        if let Some(e) = self.ensure_built() {
            return Some(Err(e));
        }
        if self.done {
            return None;
        }
        let merge = self.merge.as_mut().expect("built by ensure_built");
        let entry = merge.heap.pop()?;
        match merge.runs[entry.run_id].next_row() {
            Ok(Some(next_row)) => {
                let key = KeyTuple::of(&next_row, &entry.keys);
                merge.heap.push(HeapEntry { key, run_id: entry.run_id, row: next_row, keys: entry.keys.clone() });
            }
            Ok(None) => {}
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        }
        Some(Ok(entry.row))
    }
}

/// Default in-memory row budget before a run spills to disk.
pub(crate) const DEFAULT_MEMORY_LIMIT: usize = 1_000_000;

pub(crate) fn run(upstream: RowStream, keys: Vec<String>, limit: usize) -> RowStream {
    Box::new(SortStream {
        upstream: Some(upstream),
        keys: Rc::new(keys),
        limit: limit.max(1),
        merge: None,
        done: false,
    })
}
