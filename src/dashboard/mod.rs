//! The salary dashboard: chart bindings over a shared crossfilter index.
pub mod chart;
pub mod controller;
pub mod mount;

pub use chart::{Bar, ChartBinding, ChartRegistry, ChartSnapshot, ChartSource, GroupChart, Layer, ScatterPoint};
pub use controller::{Dashboard, DashboardError};
pub use mount::MountPoint;
