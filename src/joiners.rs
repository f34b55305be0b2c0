use crate::error::GraphResult;
use crate::joiner::{merge, Joiner};
use crate::row::Row;

const DEFAULT_SUFFIX_LEFT: &str = "_1";
const DEFAULT_SUFFIX_RIGHT: &str = "_2";

fn cartesian(keys: &[String], left: &[Row], right: &[Row], suffix_left: &str, suffix_right: &str) -> Vec<Row> {
    let mut out = Vec::with_capacity(left.len() * right.len());
    for l in left {
        for r in right {
            out.push(merge(keys, l, r, suffix_left, suffix_right));
        }
    }
    out
}

/// Cartesian product of matched groups; nothing when either side is empty.
pub struct InnerJoiner {
    pub suffix_left: String,
    pub suffix_right: String,
}

impl InnerJoiner {
    pub fn new() -> Self {
        Self { suffix_left: DEFAULT_SUFFIX_LEFT.into(), suffix_right: DEFAULT_SUFFIX_RIGHT.into() }
    }

    pub fn with_suffixes(suffix_left: impl Into<String>, suffix_right: impl Into<String>) -> Self {
        Self { suffix_left: suffix_left.into(), suffix_right: suffix_right.into() }
    }
}

impl Default for InnerJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Joiner for InnerJoiner {
    fn join(&self, keys: &[String], left: &[Row], right: &[Row]) -> GraphResult<Vec<Row>> {
        if left.is_empty() || right.is_empty() {
            return Ok(Vec::new());
        }
        Ok(cartesian(keys, left, right, &self.suffix_left, &self.suffix_right))
    }
}

/// Cartesian product when both sides are present; an empty side is filled
/// by passing the other side through **unmodified** (no suffix renaming) —
/// the source's documented, asymmetric behavior relative to the matched case.
pub struct OuterJoiner {
    pub suffix_left: String,
    pub suffix_right: String,
}

impl OuterJoiner {
    pub fn new() -> Self {
        Self { suffix_left: DEFAULT_SUFFIX_LEFT.into(), suffix_right: DEFAULT_SUFFIX_RIGHT.into() }
    }

    pub fn with_suffixes(suffix_left: impl Into<String>, suffix_right: impl Into<String>) -> Self {
        Self { suffix_left: suffix_left.into(), suffix_right: suffix_right.into() }
    }
}

impl Default for OuterJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Joiner for OuterJoiner {
    fn join(&self, keys: &[String], left: &[Row], right: &[Row]) -> GraphResult<Vec<Row>> {
        if right.is_empty() {
            return Ok(left.to_vec());
        }
        if left.is_empty() {
            return Ok(right.to_vec());
        }
        Ok(cartesian(keys, left, right, &self.suffix_left, &self.suffix_right))
    }
}

/// Cartesian product when both sides are present; left passes through
/// unmatched, right contributes nothing when left is empty.
pub struct LeftJoiner {
    pub suffix_left: String,
    pub suffix_right: String,
}

impl LeftJoiner {
    pub fn new() -> Self {
        Self { suffix_left: DEFAULT_SUFFIX_LEFT.into(), suffix_right: DEFAULT_SUFFIX_RIGHT.into() }
    }

    pub fn with_suffixes(suffix_left: impl Into<String>, suffix_right: impl Into<String>) -> Self {
        Self { suffix_left: suffix_left.into(), suffix_right: suffix_right.into() }
    }
}

impl Default for LeftJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Joiner for LeftJoiner {
    fn join(&self, keys: &[String], left: &[Row], right: &[Row]) -> GraphResult<Vec<Row>> {
        if right.is_empty() {
            return Ok(left.to_vec());
        }
        if left.is_empty() {
            return Ok(Vec::new());
        }
        Ok(cartesian(keys, left, right, &self.suffix_left, &self.suffix_right))
    }
}

/// Cartesian product when both sides are present; right passes through
/// unmatched, left contributes nothing when right is empty.
pub struct RightJoiner {
    pub suffix_left: String,
    pub suffix_right: String,
}

impl RightJoiner {
    pub fn new() -> Self {
        Self { suffix_left: DEFAULT_SUFFIX_LEFT.into(), suffix_right: DEFAULT_SUFFIX_RIGHT.into() }
    }

    pub fn with_suffixes(suffix_left: impl Into<String>, suffix_right: impl Into<String>) -> Self {
        Self { suffix_left: suffix_left.into(), suffix_right: suffix_right.into() }
    }
}

impl Default for RightJoiner {
    fn default() -> Self {
        Self::new()
    }
}

impl Joiner for RightJoiner {
    fn join(&self, keys: &[String], left: &[Row], right: &[Row]) -> GraphResult<Vec<Row>> {
        if left.is_empty() {
            return Ok(right.to_vec());
        }
        if right.is_empty() {
            return Ok(Vec::new());
        }
        Ok(cartesian(keys, left, right, &self.suffix_left, &self.suffix_right))
    }
}
