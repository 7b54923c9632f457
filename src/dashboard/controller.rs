//! Builds the charts of the salary dashboard over one shared index and
//! drives every filter transition through an explicit redraw pass.

use super::chart::{ChartBinding, ChartRegistry, ChartSnapshot, ChartSource, GroupChart};
use super::mount::MountPoint;
use crate::aggregate::{RecordPredicate, Reducer};
use crate::config::{ConfigError, DashboardConfig};
use crate::index::{Crossfilter, Filter, FilterDelta, IndexError, Key};
use crate::store::{Field, ParseError, RecordStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("No chart is mounted at {0}")]
    UnknownChart(MountPoint),
    #[error("Chart {0} has no dimension to filter")]
    NotFilterable(MountPoint),
    #[error("Could not serialize snapshots: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub struct Dashboard {
    index: Crossfilter,
    charts: ChartRegistry,
    config: DashboardConfig,
}

impl Dashboard {
    /// Loads the configured CSV file and builds the dashboard. A load failure
    /// is returned to the caller; nothing is rendered.
    pub fn open(config: DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;
        let store = RecordStore::load_csv(&config.data_path, config.parse_mode)?;
        Self::new(store, config)
    }

    pub fn new(store: RecordStore, config: DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;
        let mut index = Crossfilter::new(Arc::new(store));
        let mut charts = ChartRegistry::new();

        let [women, men] = &config.percent_genders;
        let built = [
            discipline_selector(&mut index)?,
            percent_professors(&mut index, MountPoint::PercentWomenProf, women, &config.professor_rank),
            percent_professors(&mut index, MountPoint::PercentMenProf, men, &config.professor_rank),
            gender_balance(&mut index)?,
            average_salary(&mut index)?,
            rank_distribution(&mut index, &config.ranks)?,
            salary_scatter(&mut index, MountPoint::SalaryToYearsOfService, Field::YrsService)?,
            salary_scatter(&mut index, MountPoint::SalaryToYearsSincePhd, Field::YrsSincePhd)?,
        ];
        for chart in built {
            charts.register(Box::new(chart));
        }
        charts.redraw_all(&index)?;

        info!(
            records = index.size(),
            charts = charts.len(),
            dimensions = index.dimension_count(),
            "Dashboard ready"
        );
        Ok(Self { index, charts, config })
    }

    pub fn index(&self) -> &Crossfilter { &self.index }
    pub fn config(&self) -> &DashboardConfig { &self.config }
    pub fn charts(&self) -> &ChartRegistry { &self.charts }

    fn chart(&self, mount: MountPoint) -> Result<&dyn ChartBinding, DashboardError> {
        self.charts.get(mount).ok_or(DashboardError::UnknownChart(mount))
    }

    /// Applies a selection made on the chart at `mount`, then redraws every chart.
    pub fn select(&mut self, mount: MountPoint, filter: Filter) -> Result<FilterDelta, DashboardError> {
        let dim = self.chart(mount)?.dimension().ok_or(DashboardError::NotFilterable(mount))?;
        debug!(%mount, ?filter, "Selection");
        let delta = self.index.filter(dim, filter)?;
        self.charts.redraw_all(&self.index)?;
        Ok(delta)
    }

    pub fn clear(&mut self, mount: MountPoint) -> Result<FilterDelta, DashboardError> {
        let dim = self.chart(mount)?.dimension().ok_or(DashboardError::NotFilterable(mount))?;
        let delta = self.index.filter_all(dim)?;
        self.charts.redraw_all(&self.index)?;
        Ok(delta)
    }

    /// Clears every chart's selection with a single redraw at the end.
    pub fn clear_all(&mut self) -> Result<(), DashboardError> {
        let dims: Vec<_> = self.charts.iter().filter_map(|c| c.dimension()).collect();
        for dim in dims {
            self.index.filter_all(dim)?;
        }
        self.charts.redraw_all(&self.index)?;
        Ok(())
    }

    pub fn snapshot(&self, mount: MountPoint) -> Result<&ChartSnapshot, DashboardError> {
        Ok(self.chart(mount)?.snapshot())
    }

    /// Snapshots in mount order.
    pub fn snapshots(&self) -> Vec<(MountPoint, &ChartSnapshot)> {
        self.charts.iter().map(|c| (c.mount(), c.snapshot())).collect()
    }

    /// All snapshots keyed by selector, as JSON.
    pub fn snapshot_json(&self) -> Result<String, DashboardError> {
        let by_selector: BTreeMap<&str, &ChartSnapshot> = self
            .charts
            .iter()
            .map(|c| (c.mount().selector(), c.snapshot()))
            .collect();
        Ok(serde_json::to_string_pretty(&by_selector)?)
    }

    /// `[min, max]` of a scatter chart's x axis, fixed when the chart was built.
    pub fn axis_domain(&self, mount: MountPoint) -> Result<Option<(Key, Key)>, DashboardError> {
        match self.snapshot(mount)? {
            ChartSnapshot::Scatter { x_domain, .. } => Ok(x_domain.clone()),
            _ => Ok(None),
        }
    }
}

// --- Chart builders ---

fn discipline_selector(index: &mut Crossfilter) -> Result<GroupChart, IndexError> {
    let dim = index.dimension(|r| Key::of(r, Field::Discipline))?;
    let group = index.group(dim)?;
    Ok(GroupChart::new(MountPoint::SelectDiscipline, Some(dim), ChartSource::Menu(group)))
}

/// Share of `gender` holding `professor_rank`, over every active filter.
fn percent_professors(index: &mut Crossfilter, mount: MountPoint, gender: &str, professor_rank: &str) -> GroupChart {
    let group = index.group_all(Reducer::ratio(
        RecordPredicate::equals(Field::Sex, gender),
        RecordPredicate::equals(Field::Rank, professor_rank),
    ));
    GroupChart::new(mount, None, ChartSource::Percent(group))
}

fn gender_balance(index: &mut Crossfilter) -> Result<GroupChart, IndexError> {
    let dim = index.dimension(|r| Key::of(r, Field::Sex))?;
    let group = index.group(dim)?;
    Ok(GroupChart::new(MountPoint::GenderBalance, Some(dim), ChartSource::Bars(group)))
}

fn average_salary(index: &mut Crossfilter) -> Result<GroupChart, IndexError> {
    let dim = index.dimension(|r| Key::of(r, Field::Sex))?;
    let group = index.group_reduce(dim, Reducer::mean(Field::Salary))?;
    Ok(GroupChart::new(MountPoint::AverageSalary, Some(dim), ChartSource::Bars(group)))
}

/// One ratio layer per rank. Each layer groups over its own sex dimension,
/// so a selection on this chart's `dim` narrows the stack too.
fn rank_distribution(index: &mut Crossfilter, ranks: &[String]) -> Result<GroupChart, IndexError> {
    let dim = index.dimension(|r| Key::of(r, Field::Sex))?;
    let mut layers = Vec::with_capacity(ranks.len());
    for rank in ranks {
        let layer_dim = index.dimension(|r| Key::of(r, Field::Sex))?;
        let reducer = Reducer::ratio(RecordPredicate::Any, RecordPredicate::equals(Field::Rank, rank.as_str()));
        layers.push((rank.clone(), index.group_reduce(layer_dim, reducer)?));
    }
    Ok(GroupChart::new(MountPoint::RankDistribution, Some(dim), ChartSource::Stack(layers)))
}

/// Salary against `x`. The x domain comes from a throwaway dimension over `x`
/// that is disposed once its extent is read.
fn salary_scatter(index: &mut Crossfilter, mount: MountPoint, x: Field) -> Result<GroupChart, IndexError> {
    let fields = [x, Field::Salary, Field::Rank, Field::Sex];
    let dim = index.dimension(move |r| Key::tuple(r, &fields))?;
    let group = index.group(dim)?;

    let axis = index.dimension(move |r| Key::of(r, x))?;
    let x_domain = index.extent(axis)?;
    index.dispose_dimension(axis)?;

    Ok(GroupChart::new(mount, Some(dim), ChartSource::Scatter { group, x_domain }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Scalar;
    use crate::store::{FacultyRecord, ParseMode};
    use std::io::Write;

    fn rec(discipline: &str, sex: &str, rank: &str, phd: i64, service: i64, salary: i64) -> FacultyRecord {
        FacultyRecord {
            discipline: discipline.into(),
            sex: sex.into(),
            rank: rank.into(),
            yrs_since_phd: Some(phd),
            yrs_service: Some(service),
            salary: Some(salary),
        }
    }

    fn dashboard() -> Dashboard {
        let store = RecordStore::from_records(vec![
            rec("A", "Male", "Prof", 20, 18, 140000),
            rec("A", "Female", "Prof", 15, 10, 120000),
            rec("A", "Female", "AsstProf", 3, 0, 80000),
            rec("B", "Male", "AssocProf", 12, 37, 100000),
            rec("B", "Female", "Prof", 30, 5, 130000),
            rec("B", "Male", "AsstProf", 2, 1, 75000),
        ]);
        Dashboard::new(store, DashboardConfig::default()).unwrap()
    }

    fn number(d: &Dashboard, mount: MountPoint) -> f64 {
        match d.snapshot(mount).unwrap() {
            ChartSnapshot::Number { value } => *value,
            other => panic!("Expected number, got {:?}", other),
        }
    }

    fn bar(snapshot: &ChartSnapshot, key: &str) -> f64 {
        let bars = match snapshot {
            ChartSnapshot::Bar { bars } | ChartSnapshot::Select { options: bars } => bars,
            other => panic!("Expected bars, got {:?}", other),
        };
        bars.iter().find(|b| b.key == Key::text(key)).map_or(f64::NAN, |b| b.value)
    }

    #[test]
    fn test_initial_render_covers_every_mount_point() {
        let d = dashboard();
        let mounts: Vec<MountPoint> = d.snapshots().into_iter().map(|(m, _)| m).collect();
        assert_eq!(mounts, MountPoint::ALL.to_vec());
        assert!(d.snapshots().iter().all(|(_, s)| **s != ChartSnapshot::Empty));

        assert!((number(&d, MountPoint::PercentWomenProf) - 2.0 / 3.0).abs() < 1e-12);
        assert!((number(&d, MountPoint::PercentMenProf) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(bar(d.snapshot(MountPoint::GenderBalance).unwrap(), "Female"), 3.0);
        assert_eq!(bar(d.snapshot(MountPoint::AverageSalary).unwrap(), "Male"), 105000.0);
    }

    #[test]
    fn test_discipline_selection_narrows_others_but_not_itself() {
        let mut d = dashboard();
        d.select(MountPoint::SelectDiscipline, Filter::Exact(Key::text("A"))).unwrap();

        let menu = d.snapshot(MountPoint::SelectDiscipline).unwrap();
        assert_eq!(bar(menu, "A"), 3.0);
        assert_eq!(bar(menu, "B"), 3.0);

        let balance = d.snapshot(MountPoint::GenderBalance).unwrap();
        assert_eq!(bar(balance, "Female"), 2.0);
        assert_eq!(bar(balance, "Male"), 1.0);
        assert_eq!(number(&d, MountPoint::PercentMenProf), 1.0);
        assert_eq!(bar(d.snapshot(MountPoint::AverageSalary).unwrap(), "Female"), 100000.0);
    }

    #[test]
    fn test_gender_selection_filters_average_salary_chart() {
        let mut d = dashboard();
        d.select(MountPoint::GenderBalance, Filter::Exact(Key::text("Female"))).unwrap();

        let balance = d.snapshot(MountPoint::GenderBalance).unwrap();
        assert_eq!(bar(balance, "Male"), 3.0);

        let average = d.snapshot(MountPoint::AverageSalary).unwrap();
        assert_eq!(bar(average, "Male"), 0.0);
        assert_eq!(bar(average, "Female"), 110000.0);
    }

    #[test]
    fn test_rank_distribution_layers() {
        let d = dashboard();
        let ChartSnapshot::StackedBar { layers } = d.snapshot(MountPoint::RankDistribution).unwrap() else {
            panic!("Expected stacked bars");
        };
        let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Prof", "AssocProf", "AsstProf"]);

        let share = |layer: usize, sex: &str| {
            layers[layer].bars.iter().find(|b| b.key == Key::text(sex)).map(|b| b.value).unwrap()
        };
        assert!((share(0, "Male") - 1.0 / 3.0).abs() < 1e-12);
        assert!((share(1, "Male") - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(share(1, "Female"), 0.0);
        let female_total: f64 = (0..3).map(|i| share(i, "Female")).sum();
        assert!((female_total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_selection_narrows_its_own_stack() {
        let mut d = dashboard();
        d.select(MountPoint::RankDistribution, Filter::Exact(Key::text("Female"))).unwrap();

        let ChartSnapshot::StackedBar { layers } = d.snapshot(MountPoint::RankDistribution).unwrap() else {
            panic!("Expected stacked bars");
        };
        for layer in layers {
            let male = layer.bars.iter().find(|b| b.key == Key::text("Male")).unwrap();
            assert_eq!(male.value, 0.0, "layer {}", layer.name);
        }
        let female_prof = layers[0].bars.iter().find(|b| b.key == Key::text("Female")).unwrap();
        assert!((female_prof.value - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(bar(d.snapshot(MountPoint::GenderBalance).unwrap(), "Male"), 0.0);
    }

    #[test]
    fn test_percent_display_empties_and_recovers() {
        let mut d = dashboard();
        d.select(MountPoint::GenderBalance, Filter::Exact(Key::text("Male"))).unwrap();
        assert_eq!(number(&d, MountPoint::PercentWomenProf), 0.0);
        assert!((number(&d, MountPoint::PercentMenProf) - 1.0 / 3.0).abs() < 1e-12);

        d.clear(MountPoint::GenderBalance).unwrap();
        assert!((number(&d, MountPoint::PercentWomenProf) - 2.0 / 3.0).abs() < 1e-12);
        assert!((number(&d, MountPoint::PercentMenProf) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_scatter_domains_and_brush() {
        let mut d = dashboard();
        assert_eq!(
            d.axis_domain(MountPoint::SalaryToYearsOfService).unwrap(),
            Some((Key::int(0), Key::int(37)))
        );
        assert_eq!(
            d.axis_domain(MountPoint::SalaryToYearsSincePhd).unwrap(),
            Some((Key::int(2), Key::int(30)))
        );
        assert_eq!(d.axis_domain(MountPoint::GenderBalance).unwrap(), None);
        // Helper axis dimensions are released after use; each rank layer keeps its own.
        assert_eq!(d.index().dimension_count(), 9);

        let brush = Filter::Rect {
            x: (Scalar::Int(0), Scalar::Int(11)),
            y: (Scalar::Int(100000), Scalar::Int(200000)),
        };
        d.select(MountPoint::SalaryToYearsOfService, brush).unwrap();
        assert_eq!(bar(d.snapshot(MountPoint::GenderBalance).unwrap(), "Female"), 2.0);
        assert_eq!(bar(d.snapshot(MountPoint::GenderBalance).unwrap(), "Male"), 0.0);
    }

    #[test]
    fn test_clear_restores_every_snapshot() {
        let mut d = dashboard();
        let before: Vec<ChartSnapshot> = d.snapshots().into_iter().map(|(_, s)| s.clone()).collect();

        d.select(MountPoint::SelectDiscipline, Filter::one_of(["B"])).unwrap();
        d.select(MountPoint::GenderBalance, Filter::Exact(Key::text("Male"))).unwrap();
        d.clear(MountPoint::GenderBalance).unwrap();
        d.clear_all().unwrap();

        let after: Vec<ChartSnapshot> = d.snapshots().into_iter().map(|(_, s)| s.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_percent_display_is_not_filterable() {
        let mut d = dashboard();
        let err = d.select(MountPoint::PercentWomenProf, Filter::Exact(Key::text("x"))).unwrap_err();
        assert!(matches!(err, DashboardError::NotFilterable(MountPoint::PercentWomenProf)));
    }

    #[test]
    fn test_snapshot_json_is_keyed_by_selector() {
        let d = dashboard();
        let json: serde_json::Value = serde_json::from_str(&d.snapshot_json().unwrap()).unwrap();
        assert_eq!(json["#percent-men-prof"]["type"], "number");
        assert_eq!(json["#gender-balance"]["bars"][0]["key"], "Female");
        assert_eq!(json["#salary-to-years-of-service"]["x_domain"][1], 37);
    }

    #[test]
    fn test_open_reads_csv_and_reports_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rank,discipline,yrs_since_phd,yrs_service,sex,salary").unwrap();
        writeln!(file, "Prof,B,19,18,Male,139750").unwrap();
        writeln!(file, "AsstProf,B,4,3,Female,n/a").unwrap();

        let config = DashboardConfig { data_path: file.path().to_path_buf(), ..Default::default() };
        let d = Dashboard::open(config).unwrap();
        assert_eq!(d.index().size(), 2);
        assert!(bar(d.snapshot(MountPoint::AverageSalary).unwrap(), "Female").is_nan());

        let strict = DashboardConfig {
            data_path: file.path().to_path_buf(),
            parse_mode: ParseMode::Strict,
            ..Default::default()
        };
        assert!(matches!(Dashboard::open(strict), Err(DashboardError::Parse(ParseError::InvalidNumber { .. }))));

        let missing = DashboardConfig { data_path: "/definitely/not/here.csv".into(), ..Default::default() };
        assert!(matches!(Dashboard::open(missing), Err(DashboardError::Parse(ParseError::Io(_)))));
    }
}
