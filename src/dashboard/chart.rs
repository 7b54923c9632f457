//! Chart bindings: a dimension plus the group(s) a chart reads, and the
//! registry that redraws them after each filter transition.

use super::mount::MountPoint;
use crate::index::{Crossfilter, DimensionId, GroupId, GroupView, IndexError, Key, Scalar};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub key: Key,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: Scalar,
    pub y: Scalar,
    pub count: i64,
    pub title: String,
    /// Colour category (the record's sex).
    pub color: Scalar,
}

/// What a chart last drew.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartSnapshot {
    Empty,
    Select { options: Vec<Bar> },
    Number { value: f64 },
    Bar { bars: Vec<Bar> },
    StackedBar { layers: Vec<Layer> },
    Scatter { x_domain: Option<(Key, Key)>, points: Vec<ScatterPoint> },
}

/// Where a chart's numbers come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSource {
    Menu(GroupId),
    /// Group-all ratio shown as a single number.
    Percent(GroupId),
    Bars(GroupId),
    Stack(Vec<(String, GroupId)>),
    Scatter { group: GroupId, x_domain: Option<(Key, Key)> },
}

pub trait ChartBinding: Send {
    fn mount(&self) -> MountPoint;
    /// The dimension this chart filters, if it can filter at all.
    fn dimension(&self) -> Option<DimensionId>;
    /// Re-reads group state from the index.
    fn redraw(&mut self, index: &Crossfilter) -> Result<(), IndexError>;
    fn snapshot(&self) -> &ChartSnapshot;
}

/// The chart binding used for every dashboard chart.
#[derive(Debug, Clone)]
pub struct GroupChart {
    mount: MountPoint,
    dimension: Option<DimensionId>,
    source: ChartSource,
    snapshot: ChartSnapshot,
}

impl GroupChart {
    pub fn new(mount: MountPoint, dimension: Option<DimensionId>, source: ChartSource) -> Self {
        Self { mount, dimension, source, snapshot: ChartSnapshot::Empty }
    }

    pub fn source(&self) -> &ChartSource { &self.source }
}

impl ChartBinding for GroupChart {
    fn mount(&self) -> MountPoint { self.mount }
    fn dimension(&self) -> Option<DimensionId> { self.dimension }

    fn redraw(&mut self, index: &Crossfilter) -> Result<(), IndexError> {
        self.snapshot = match &self.source {
            ChartSource::Menu(g) => ChartSnapshot::Select { options: bars(&index.group_view(*g)?) },
            ChartSource::Percent(g) => {
                let view = index.group_view(*g)?;
                ChartSnapshot::Number { value: view.value().map_or(0.0, |s| s.value()) }
            }
            ChartSource::Bars(g) => ChartSnapshot::Bar { bars: bars(&index.group_view(*g)?) },
            ChartSource::Stack(layers) => {
                let mut out = Vec::with_capacity(layers.len());
                for (name, g) in layers {
                    out.push(Layer { name: name.clone(), bars: bars(&index.group_view(*g)?) });
                }
                ChartSnapshot::StackedBar { layers: out }
            }
            ChartSource::Scatter { group, x_domain } => ChartSnapshot::Scatter {
                x_domain: x_domain.clone(),
                points: points(&index.group_view(*group)?),
            },
        };
        Ok(())
    }

    fn snapshot(&self) -> &ChartSnapshot { &self.snapshot }
}

fn bars(view: &GroupView) -> Vec<Bar> {
    view.iter().map(|(key, state)| Bar { key: key.clone(), value: state.value() }).collect()
}

/// Scatter keys are `(x, salary, rank, sex)`.
fn points(view: &GroupView) -> Vec<ScatterPoint> {
    view.iter()
        .map(|(key, state)| {
            let part = |i: usize| key.component(i).cloned().unwrap_or(Scalar::Missing);
            let (x, y, rank, sex) = (part(0), part(1), part(2), part(3));
            ScatterPoint {
                title: format!("{} earned {}", rank, y),
                x,
                y,
                count: state.as_count().map_or(0, |c| c.count),
                color: sex,
            }
        })
        .collect()
}

/// Every chart on the page, redrawn together in registration order.
#[derive(Default)]
pub struct ChartRegistry {
    charts: Vec<Box<dyn ChartBinding>>,
}

impl ChartRegistry {
    pub fn new() -> Self { Self::default() }

    pub fn register(&mut self, chart: Box<dyn ChartBinding>) {
        self.charts.push(chart);
    }

    pub fn redraw_all(&mut self, index: &Crossfilter) -> Result<(), IndexError> {
        for chart in self.charts.iter_mut() {
            chart.redraw(index)?;
        }
        tracing::debug!(charts = self.charts.len(), "Redrew all charts");
        Ok(())
    }

    pub fn get(&self, mount: MountPoint) -> Option<&dyn ChartBinding> {
        self.charts.iter().find(|c| c.mount() == mount).map(|c| &**c)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ChartBinding> {
        self.charts.iter().map(|c| &**c)
    }

    pub fn len(&self) -> usize { self.charts.len() }
    pub fn is_empty(&self) -> bool { self.charts.is_empty() }
}
