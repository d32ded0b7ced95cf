// Time index builder - Distinct, sorted, range-limited and strided timestamp keys
use crate::domain::time_key::TimeKey;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    pub range_start: Option<TimeKey>,
    pub range_end: Option<TimeKey>,
    /// Keep every Nth key after range filtering. 0 is treated as 1.
    pub stride: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            range_start: None,
            range_end: None,
            stride: 1,
        }
    }
}

impl IndexOptions {
    pub fn contains(&self, key: TimeKey) -> bool {
        self.range_start.is_none_or(|start| key >= start)
            && self.range_end.is_none_or(|end| key <= end)
    }
}

/// Builds the index from any number of key sources.
///
/// Decimation is by position in the filtered list (`filtered[i]` is kept iff
/// `i % stride == 0`), not by time gap, so the exact keys that survive are
/// predictable from the input alone.
pub fn build_index<I>(keys: I, options: &IndexOptions) -> Vec<TimeKey>
where
    I: IntoIterator<Item = TimeKey>,
{
    let stride = options.stride.max(1);
    let distinct: BTreeSet<TimeKey> = keys.into_iter().collect();

    distinct
        .into_iter()
        .filter(|key| options.contains(*key))
        .step_by(stride)
        .collect()
}
