use super::dimension::DimensionId;
use super::key::Key;
use crate::aggregate::{AggregateState, Reducer};
use crate::store::{FacultyRecord, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl GroupId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// Aggregates of one dimension's records, bucketed by group key.
///
/// A group sees a record when it passes every filter except the owning
/// dimension's own. Group-all groups have no owner and see only records
/// passing every filter.
pub(crate) struct Group {
    pub(crate) owner: Option<DimensionId>,
    keys: GroupKeys,
    reducer: Reducer,
    states: BTreeMap<Key, AggregateState>,
}

impl Group {
    /// Creates a zero state for every key present in the data, then adds the
    /// records currently visible to the group in insertion order.
    pub(crate) fn build(
        owner: Option<DimensionId>,
        keys: GroupKeys,
        reducer: Reducer,
        records: &[FacultyRecord],
        masks: &[u64],
    ) -> Self {
        let mut group = Self { owner, keys, reducer, states: BTreeMap::new() };
        for (i, record) in records.iter().enumerate() {
            let key = group.keys.get(RecordId::new(i));
            let state = group
                .states
                .entry(key.clone())
                .or_insert_with(|| group.reducer.initial());
            if visible(owner, masks[i]) {
                group.reducer.add(state, record);
            }
        }
        group
    }

    #[inline(always)]
    pub(crate) fn sees(&self, mask: u64) -> bool {
        visible(self.owner, mask)
    }

    /// Applies one record's membership change. `before` / `after` are the
    /// record's filter masks around the transition.
    pub(crate) fn apply(&mut self, id: RecordId, record: &FacultyRecord, before: u64, after: u64) {
        let (was, is) = (self.sees(before), self.sees(after));
        if was == is {
            return;
        }
        let key = self.keys.get(id);
        if let Some(state) = self.states.get_mut(key) {
            if is {
                self.reducer.add(state, record);
            } else {
                self.reducer.remove(state, record);
            }
        }
    }

    pub(crate) fn view(&self) -> GroupView {
        GroupView {
            entries: self.states.iter().map(|(k, s)| (k.clone(), *s)).collect(),
        }
    }

    pub(crate) fn reducer(&self) -> &Reducer { &self.reducer }
}

static ALL: Key = Key::All;

/// How a group maps records to its keys.
pub(crate) enum GroupKeys {
    /// Every record falls in the single `Key::All` bucket.
    All,
    /// Group key per record, indexed by `RecordId`.
    PerRecord(Vec<Key>),
}

impl GroupKeys {
    #[inline(always)]
    fn get(&self, id: RecordId) -> &Key {
        match self {
            GroupKeys::All => &ALL,
            GroupKeys::PerRecord(keys) => &keys[id.index()],
        }
    }
}

#[inline(always)]
fn visible(owner: Option<DimensionId>, mask: u64) -> bool {
    let ignored = owner.map_or(0, |d| d.bit());
    mask & !ignored == 0
}

/// Materialized `(key, state)` pairs of a group, sorted by key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupView {
    pub entries: Vec<(Key, AggregateState)>,
}

impl GroupView {
    pub fn size(&self) -> usize { self.entries.len() }

    pub fn get(&self, key: &Key) -> Option<&AggregateState> {
        self.entries
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .map(|i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Key, AggregateState)> {
        self.entries.iter()
    }

    /// The single value of a group-all group.
    pub fn value(&self) -> Option<&AggregateState> {
        self.get(&Key::All)
    }
}
