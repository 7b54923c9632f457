//! Incremental aggregators: reducers that keep a running value as records
//! enter or leave a group's visible set.
pub mod reducer;
pub mod state;

pub use reducer::{RecordPredicate, Reducer};
pub use state::{AggregateState, CountState, MeanState, RatioState};
