//! Text rendering of chart snapshots.
pub mod summary;

pub use summary::{format_chart, format_dashboard, format_percent};
