use crate::error::GraphResult;
use crate::row::Row;

/// A join strategy: given a key tuple and the left/right rows sharing that
/// key (either side may be empty, never both), produces the matched output
/// rows. May materialize either side.
pub trait Joiner {
    fn join(&self, keys: &[String], left: &[Row], right: &[Row]) -> GraphResult<Vec<Row>>;
}

/// Deep-copies `right`, renames any non-key column colliding with `left`
/// using the configured suffixes on both sides, then overlays `left`'s
/// (possibly renamed) columns on top. Key columns are never suffixed and
/// come through once.
pub(crate) fn merge(keys: &[String], left: &Row, right: &Row, suffix_left: &str, suffix_right: &str) -> Row {
    let mut merged = right.clone();
    let mut left = left.clone();

    let colliding: Vec<String> = left
        .keys()
        .filter(|c| right.contains_key(*c) && !keys.contains(c))
        .cloned()
        .collect();

    for col in colliding {
        if let Some(v) = left.remove(&col) {
            left.insert(format!("{col}{suffix_left}"), v);
        }
        if let Some(v) = merged.remove(&col) {
            merged.insert(format!("{col}{suffix_right}"), v);
        }
    }

    merged.extend(left);
    merged
}
