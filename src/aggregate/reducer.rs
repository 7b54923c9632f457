//! The closed set of reducers and their `initial` / `add` / `remove` rules.

use super::state::{AggregateState, CountState, MeanState, RatioState};
use crate::store::{FacultyRecord, Field};
use serde::{Deserialize, Serialize};

/// Condition over a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordPredicate {
    Any,
    /// Categorical field equals `value`. Never true for numeric fields.
    Equals { field: Field, value: String },
}

impl RecordPredicate {
    pub fn equals(field: Field, value: impl Into<String>) -> Self {
        RecordPredicate::Equals { field, value: value.into() }
    }

    pub fn matches(&self, record: &FacultyRecord) -> bool {
        match self {
            RecordPredicate::Any => true,
            RecordPredicate::Equals { field, value } => record.label(*field) == Some(value.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reducer {
    Count,
    /// Share of records within `scope` that also satisfy `hit`.
    Ratio { scope: RecordPredicate, hit: RecordPredicate },
    /// Running mean of a numeric field.
    Mean { field: Field },
}

impl Reducer {
    pub fn ratio(scope: RecordPredicate, hit: RecordPredicate) -> Self {
        Reducer::Ratio { scope, hit }
    }

    pub fn mean(field: Field) -> Self {
        Reducer::Mean { field }
    }

    pub fn initial(&self) -> AggregateState {
        match self {
            Reducer::Count => AggregateState::Count(CountState::default()),
            Reducer::Ratio { .. } => AggregateState::Ratio(RatioState::default()),
            Reducer::Mean { .. } => AggregateState::Mean(MeanState::default()),
        }
    }

    pub fn add(&self, state: &mut AggregateState, record: &FacultyRecord) {
        match (self, state) {
            (Reducer::Count, AggregateState::Count(s)) => s.add(),
            (Reducer::Ratio { scope, hit }, AggregateState::Ratio(s)) => {
                s.add(scope.matches(record), hit.matches(record))
            }
            (Reducer::Mean { field }, AggregateState::Mean(s)) => s.add(numeric(record, *field)),
            (reducer, state) => mismatch(reducer, state),
        }
    }

    pub fn remove(&self, state: &mut AggregateState, record: &FacultyRecord) {
        match (self, state) {
            (Reducer::Count, AggregateState::Count(s)) => s.remove(),
            (Reducer::Ratio { scope, hit }, AggregateState::Ratio(s)) => {
                s.remove(scope.matches(record), hit.matches(record))
            }
            (Reducer::Mean { field }, AggregateState::Mean(s)) => s.remove(numeric(record, *field)),
            (reducer, state) => mismatch(reducer, state),
        }
    }
}

/// The sentinel contributes NaN, as a failed integer parse would.
fn numeric(record: &FacultyRecord, field: Field) -> f64 {
    record.number(field).map_or(f64::NAN, |v| v as f64)
}

// States are only ever created by `initial` of the owning reducer.
fn mismatch(reducer: &Reducer, state: &AggregateState) {
    debug_assert!(false, "reducer {:?} applied to foreign state {:?}", reducer, state);
    tracing::error!(?reducer, ?state, "Reducer/state mismatch; update skipped");
}
