use super::filter::Filter;
use super::key::Key;
use crate::store::{FacultyRecord, RecordId};
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub type KeyFn = Box<dyn Fn(&FacultyRecord) -> Key + Send + Sync>;

/// Handle to a dimension. The index doubles as the dimension's filter bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct DimensionId(pub u32);

impl DimensionId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }

    #[inline(always)]
    pub fn bit(&self) -> u64 { 1u64 << self.0 }
}

/// A projection of every record to a key, with its own sort order and filter.
pub(crate) struct Dimension {
    /// Key per record, indexed by `RecordId`.
    pub(crate) keys: Vec<Key>,
    /// Record ids ordered by key; ties keep insertion order.
    pub(crate) sorted: Vec<RecordId>,
    pub(crate) filter: Option<Filter>,
}

impl Dimension {
    pub(crate) fn build(records: &[FacultyRecord], key_fn: &KeyFn) -> Self {
        let keys: Vec<Key> = records.iter().map(|r| key_fn(r)).collect();
        let mut sorted: Vec<RecordId> = (0..keys.len()).map(RecordId::new).collect();
        // Stable sort keeps equal keys in source order.
        sorted.sort_by(|a, b| keys[a.index()].cmp(&keys[b.index()]));
        Self { keys, sorted, filter: None }
    }

    /// Pass flag per record under the current filter, indexed by `RecordId`.
    /// Exact and range filters are resolved by binary search over `sorted`.
    pub(crate) fn pass_flags(&self) -> Vec<bool> {
        match &self.filter {
            None => vec![true; self.keys.len()],
            Some(Filter::Exact(key)) => self.mark(self.span(key, key, true)),
            Some(Filter::Range { lo, hi }) => self.mark(self.span(lo, hi, false)),
            Some(filter) => self.keys.iter().map(|k| filter.matches(k)).collect(),
        }
    }

    /// Positions in `sorted` whose keys fall in `[lo, hi)`, or `[lo, hi]`
    /// when `inclusive`.
    fn span(&self, lo: &Key, hi: &Key, inclusive: bool) -> Range<usize> {
        let start = self.sorted.partition_point(|id| self.keys[id.index()] < *lo);
        let end = self.sorted.partition_point(|id| {
            let key = &self.keys[id.index()];
            if inclusive { key <= hi } else { key < hi }
        });
        start..end.max(start)
    }

    fn mark(&self, span: Range<usize>) -> Vec<bool> {
        let mut flags = vec![false; self.keys.len()];
        for id in &self.sorted[span] {
            flags[id.index()] = true;
        }
        flags
    }

    pub(crate) fn key(&self, id: RecordId) -> &Key {
        &self.keys[id.index()]
    }
}
