//! A synchronous, single-threaded multi-dimensional filter index.
//!
//! Every record carries a bitmask with one bit per dimension: bit `d` is set
//! while dimension `d`'s filter excludes the record. A filter change only
//! flips bits of that one dimension, so the records whose bit changed are the
//! exact delta each group must apply.

use super::dimension::{Dimension, DimensionId, KeyFn};
use super::filter::Filter;
use super::group::{Group, GroupId, GroupKeys, GroupView};
use super::key::Key;
use crate::aggregate::Reducer;
use crate::store::{FacultyRecord, RecordId, RecordStore};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// One bit per dimension in a `u64` mask.
pub const MAX_DIMENSIONS: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("At most {limit} dimensions can be active at once")]
    TooManyDimensions { limit: usize },
    #[error("Unknown dimension {0:?}")]
    UnknownDimension(DimensionId),
    #[error("Unknown group {0:?}")]
    UnknownGroup(GroupId),
}

/// Records whose membership under one dimension's filter changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDelta {
    /// Records the dimension's filter now lets through.
    pub entered: Vec<RecordId>,
    /// Records the dimension's filter now excludes.
    pub left: Vec<RecordId>,
}

impl FilterDelta {
    pub fn is_empty(&self) -> bool { self.entered.is_empty() && self.left.is_empty() }
}

pub struct Crossfilter {
    store: Arc<RecordStore>,
    masks: Vec<u64>,
    dimensions: Vec<Option<Dimension>>,
    groups: Vec<Option<Group>>,
}

impl Crossfilter {
    pub fn new(store: Arc<RecordStore>) -> Self {
        let masks = vec![0; store.len()];
        Self { store, masks, dimensions: Vec::new(), groups: Vec::new() }
    }

    pub fn store(&self) -> &RecordStore { &self.store }
    pub fn size(&self) -> usize { self.store.len() }

    // --- Dimensions ---

    /// Registers a projection from records to keys. Freed slots are reused.
    pub fn dimension<F>(&mut self, key_fn: F) -> Result<DimensionId, IndexError>
    where
        F: Fn(&FacultyRecord) -> Key + Send + Sync + 'static,
    {
        let key_fn: KeyFn = Box::new(key_fn);
        let dim = Dimension::build(self.store.all(), &key_fn);

        let slot = match self.dimensions.iter().position(Option::is_none) {
            Some(free) => free,
            None if self.dimensions.len() < MAX_DIMENSIONS => {
                self.dimensions.push(None);
                self.dimensions.len() - 1
            }
            None => return Err(IndexError::TooManyDimensions { limit: MAX_DIMENSIONS }),
        };
        self.dimensions[slot] = Some(dim);
        Ok(DimensionId::new(slot))
    }

    /// Clears the dimension's filter (propagating the delta), discards its
    /// groups and frees its slot.
    pub fn dispose_dimension(&mut self, dim: DimensionId) -> Result<(), IndexError> {
        self.filter_all(dim)?;
        for slot in self.groups.iter_mut() {
            if slot.as_ref().map_or(false, |g| g.owner == Some(dim)) {
                *slot = None;
            }
        }
        self.dimensions[dim.index()] = None;
        debug!(dimension = dim.0, "Disposed dimension");
        Ok(())
    }

    fn dim(&self, dim: DimensionId) -> Result<&Dimension, IndexError> {
        self.dimensions
            .get(dim.index())
            .and_then(Option::as_ref)
            .ok_or(IndexError::UnknownDimension(dim))
    }

    // --- Filtering ---

    pub fn filter(&mut self, dim: DimensionId, filter: Filter) -> Result<FilterDelta, IndexError> {
        self.set_filter(dim, Some(filter))
    }

    pub fn filter_exact(&mut self, dim: DimensionId, key: impl Into<Key>) -> Result<FilterDelta, IndexError> {
        self.set_filter(dim, Some(Filter::Exact(key.into())))
    }

    /// Half-open `[lo, hi)`.
    pub fn filter_range(
        &mut self,
        dim: DimensionId,
        lo: impl Into<Key>,
        hi: impl Into<Key>,
    ) -> Result<FilterDelta, IndexError> {
        self.set_filter(dim, Some(Filter::Range { lo: lo.into(), hi: hi.into() }))
    }

    pub fn filter_all(&mut self, dim: DimensionId) -> Result<FilterDelta, IndexError> {
        self.set_filter(dim, None)
    }

    pub fn current_filter(&self, dim: DimensionId) -> Result<Option<&Filter>, IndexError> {
        Ok(self.dim(dim)?.filter.as_ref())
    }

    /// Replaces the dimension's filter, then hands every group the records
    /// whose visibility changed, in insertion order. Re-applying an equal
    /// filter yields an empty delta.
    fn set_filter(&mut self, dim: DimensionId, filter: Option<Filter>) -> Result<FilterDelta, IndexError> {
        let bit = dim.bit();
        let dimension = self
            .dimensions
            .get_mut(dim.index())
            .and_then(Option::as_mut)
            .ok_or(IndexError::UnknownDimension(dim))?;
        dimension.filter = filter;

        let passing = dimension.pass_flags();

        let mut delta = FilterDelta::default();
        let mut transitions = Vec::new();
        for (i, (mask, &passes)) in self.masks.iter_mut().zip(&passing).enumerate() {
            let id = RecordId::new(i);
            let before = *mask;
            let after = if passes { before & !bit } else { before | bit };
            if before == after {
                continue;
            }
            *mask = after;
            transitions.push((id, before, after));
            if after & bit == 0 {
                delta.entered.push(id);
            } else {
                delta.left.push(id);
            }
        }

        let records = self.store.all();
        let mut notified = 0;
        for group in self.groups.iter_mut().flatten() {
            if group.owner == Some(dim) {
                continue;
            }
            notified += 1;
            for &(id, before, after) in &transitions {
                group.apply(id, &records[id.index()], before, after);
            }
        }

        debug!(
            dimension = dim.0,
            entered = delta.entered.len(),
            left = delta.left.len(),
            groups = notified,
            "Filter updated"
        );
        Ok(delta)
    }

    // --- Groups ---

    /// Count group keyed by the dimension's own key.
    pub fn group(&mut self, dim: DimensionId) -> Result<GroupId, IndexError> {
        self.group_by(dim, Key::clone, Reducer::Count)
    }

    /// Group keyed by the dimension's own key, reduced with `reducer`.
    pub fn group_reduce(&mut self, dim: DimensionId, reducer: Reducer) -> Result<GroupId, IndexError> {
        self.group_by(dim, Key::clone, reducer)
    }

    /// Group whose keys are derived from the dimension's keys by `group_fn`.
    pub fn group_by<F>(&mut self, dim: DimensionId, group_fn: F, reducer: Reducer) -> Result<GroupId, IndexError>
    where
        F: Fn(&Key) -> Key,
    {
        let keys = self.dim(dim)?.keys.iter().map(group_fn).collect();
        let group = Group::build(Some(dim), GroupKeys::PerRecord(keys), reducer, self.store.all(), &self.masks);
        Ok(self.insert_group(group))
    }

    /// Single-bucket group observing every filter.
    pub fn group_all(&mut self, reducer: Reducer) -> GroupId {
        let group = Group::build(None, GroupKeys::All, reducer, self.store.all(), &self.masks);
        self.insert_group(group)
    }

    fn insert_group(&mut self, group: Group) -> GroupId {
        match self.groups.iter().position(Option::is_none) {
            Some(free) => {
                self.groups[free] = Some(group);
                GroupId::new(free)
            }
            None => {
                self.groups.push(Some(group));
                GroupId::new(self.groups.len() - 1)
            }
        }
    }

    pub fn dispose_group(&mut self, id: GroupId) -> Result<(), IndexError> {
        let slot = self.groups.get_mut(id.index()).ok_or(IndexError::UnknownGroup(id))?;
        if slot.take().is_none() {
            return Err(IndexError::UnknownGroup(id));
        }
        Ok(())
    }

    fn grp(&self, id: GroupId) -> Result<&Group, IndexError> {
        self.groups
            .get(id.index())
            .and_then(Option::as_ref)
            .ok_or(IndexError::UnknownGroup(id))
    }

    /// `(key, state)` pairs sorted by key.
    pub fn group_view(&self, id: GroupId) -> Result<GroupView, IndexError> {
        Ok(self.grp(id)?.view())
    }

    pub fn group_reducer(&self, id: GroupId) -> Result<&Reducer, IndexError> {
        Ok(self.grp(id)?.reducer())
    }

    // --- Record queries (all filters apply) ---

    pub fn is_filtered_out(&self, id: RecordId) -> bool {
        self.masks.get(id.index()).map_or(true, |&m| m != 0)
    }

    /// Records passing every filter, in insertion order.
    pub fn all_filtered(&self) -> Vec<&FacultyRecord> {
        self.store
            .all()
            .iter()
            .zip(&self.masks)
            .filter(|(_, &m)| m == 0)
            .map(|(r, _)| r)
            .collect()
    }

    /// Up to `n` records with the largest keys, largest first.
    pub fn top(&self, dim: DimensionId, n: usize) -> Result<Vec<&FacultyRecord>, IndexError> {
        let d = self.dim(dim)?;
        Ok(self.visible_records(d.sorted.iter().rev(), n))
    }

    /// Up to `n` records with the smallest keys, smallest first.
    pub fn bottom(&self, dim: DimensionId, n: usize) -> Result<Vec<&FacultyRecord>, IndexError> {
        let d = self.dim(dim)?;
        Ok(self.visible_records(d.sorted.iter(), n))
    }

    fn visible_records<'a>(&'a self, ids: impl Iterator<Item = &'a RecordId>, n: usize) -> Vec<&'a FacultyRecord> {
        ids.filter(|id| self.masks[id.index()] == 0)
            .take(n)
            .map(|id| &self.store.all()[id.index()])
            .collect()
    }

    /// `(min, max)` key of the dimension over visible records, skipping keys
    /// holding the non-numeric sentinel. `None` when nothing qualifies.
    pub fn extent(&self, dim: DimensionId) -> Result<Option<(Key, Key)>, IndexError> {
        let d = self.dim(dim)?;
        let usable = |id: &&RecordId| self.masks[id.index()] == 0 && !d.key(**id).is_missing();
        let lo = d.sorted.iter().find(usable);
        let hi = d.sorted.iter().rev().find(usable);
        Ok(match (lo, hi) {
            (Some(lo), Some(hi)) => Some((d.key(*lo).clone(), d.key(*hi).clone())),
            _ => None,
        })
    }

    pub fn dimension_count(&self) -> usize {
        self.dimensions.iter().flatten().count()
    }

    pub fn group_count(&self) -> usize {
        self.groups.iter().flatten().count()
    }
}
