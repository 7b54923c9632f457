//! Dimension / filter index over the record store.
pub mod crossfilter;
pub mod dimension;
pub mod filter;
pub mod group;
pub mod key;

pub use crossfilter::{Crossfilter, FilterDelta, IndexError, MAX_DIMENSIONS};
pub use dimension::DimensionId;
pub use filter::Filter;
pub use group::{GroupId, GroupView};
pub use key::{Key, Scalar};
