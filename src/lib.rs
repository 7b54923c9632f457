// Core of the faculty salary dashboard: record store, crossfilter index,
// incremental aggregators and chart bindings. The optional `python` feature
// exposes the dashboard as the `_core` extension module.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod index;
pub mod store;

#[cfg(feature = "python")]
pub mod bindings {
    pub mod python;
}

pub use aggregate::{AggregateState, RecordPredicate, Reducer};
pub use config::{ConfigError, DashboardConfig};
pub use dashboard::{ChartSnapshot, Dashboard, DashboardError, MountPoint};
pub use index::{Crossfilter, DimensionId, Filter, GroupId, GroupView, IndexError, Key, Scalar};
pub use store::{FacultyRecord, Field, ParseError, ParseMode, RecordId, RecordStore};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Confirms the Rust core is callable from Python.
#[cfg(feature = "python")]
#[pyfunction]
fn rust_core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Defines the `_core` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(rust_core_version, m)?)?;
    m.add_class::<bindings::python::PyDashboard>()?;
    Ok(())
}
