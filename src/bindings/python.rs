use crate::config::DashboardConfig;
use crate::dashboard::{Dashboard, DashboardError, MountPoint};
use crate::display::summary;
use crate::index::{Filter, Key, Scalar};
use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn to_py_err(e: DashboardError) -> PyErr {
    match e {
        DashboardError::Parse(crate::store::ParseError::Io(io)) => PyIOError::new_err(io.to_string()),
        DashboardError::Index(_) | DashboardError::Serialize(_) => PyRuntimeError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

fn mount(selector: &str) -> PyResult<MountPoint> {
    selector.parse().map_err(PyValueError::new_err)
}

#[pyclass(name = "_Dashboard", unsendable)]
pub struct PyDashboard {
    inner: Dashboard,
}

#[pymethods]
impl PyDashboard {
    /// Loads the dataset at `path`. `config_json` overrides defaults.
    #[new]
    #[pyo3(signature = (path, config_json=None))]
    pub fn new(path: String, config_json: Option<String>) -> PyResult<Self> {
        let mut config = match config_json {
            Some(json) => DashboardConfig::from_json_str(&json).map_err(|e| PyValueError::new_err(e.to_string()))?,
            None => DashboardConfig::default(),
        };
        config.data_path = path.into();
        let inner = Dashboard::open(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Selects one or more categorical values on a chart (menu or bar click).
    pub fn select(&mut self, selector: &str, values: Vec<String>) -> PyResult<()> {
        let filter = match values.len() {
            1 => Filter::Exact(Key::text(values[0].clone())),
            _ => Filter::one_of(values),
        };
        self.inner.select(mount(selector)?, filter).map_err(to_py_err)?;
        Ok(())
    }

    /// Rectangular brush on a scatter chart, half-open on both axes.
    pub fn brush(&mut self, selector: &str, x0: i64, x1: i64, y0: i64, y1: i64) -> PyResult<()> {
        let filter = Filter::Rect {
            x: (Scalar::Int(x0), Scalar::Int(x1)),
            y: (Scalar::Int(y0), Scalar::Int(y1)),
        };
        self.inner.select(mount(selector)?, filter).map_err(to_py_err)?;
        Ok(())
    }

    pub fn clear(&mut self, selector: &str) -> PyResult<()> {
        self.inner.clear(mount(selector)?).map_err(to_py_err)?;
        Ok(())
    }

    pub fn clear_all(&mut self) -> PyResult<()> {
        self.inner.clear_all().map_err(to_py_err)
    }

    pub fn snapshot_json(&self) -> PyResult<String> {
        self.inner.snapshot_json().map_err(to_py_err)
    }

    pub fn axis_domain(&self, selector: &str) -> PyResult<Option<(i64, i64)>> {
        let domain = self.inner.axis_domain(mount(selector)?).map_err(to_py_err)?;
        Ok(domain.and_then(|(lo, hi)| {
            let lo = lo.component(0)?.as_int()?;
            let hi = hi.component(0)?.as_int()?;
            Some((lo, hi))
        }))
    }

    pub fn report(&self) -> String {
        summary::format_dashboard(&self.inner)
    }

    pub fn record_count(&self) -> usize { self.inner.index().size() }
}
