use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Logical mount points of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MountPoint {
    SelectDiscipline,
    PercentWomenProf,
    PercentMenProf,
    GenderBalance,
    AverageSalary,
    RankDistribution,
    SalaryToYearsOfService,
    SalaryToYearsSincePhd,
}

impl MountPoint {
    pub const ALL: [MountPoint; 8] = [
        MountPoint::SelectDiscipline,
        MountPoint::PercentWomenProf,
        MountPoint::PercentMenProf,
        MountPoint::GenderBalance,
        MountPoint::AverageSalary,
        MountPoint::RankDistribution,
        MountPoint::SalaryToYearsOfService,
        MountPoint::SalaryToYearsSincePhd,
    ];

    pub fn selector(&self) -> &'static str {
        match self {
            MountPoint::SelectDiscipline => "#select-discipline",
            MountPoint::PercentWomenProf => "#percent-women-prof",
            MountPoint::PercentMenProf => "#percent-men-prof",
            MountPoint::GenderBalance => "#gender-balance",
            MountPoint::AverageSalary => "#average-salary",
            MountPoint::RankDistribution => "#rank-distribution",
            MountPoint::SalaryToYearsOfService => "#salary-to-years-of-service",
            MountPoint::SalaryToYearsSincePhd => "#salary-to-years-since-phd",
        }
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

impl FromStr for MountPoint {
    type Err = String;

    /// Accepts the selector with or without its leading `#`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().trim_start_matches('#');
        MountPoint::ALL
            .into_iter()
            .find(|m| &m.selector()[1..] == id)
            .ok_or_else(|| format!("Unknown mount point '{}'", s))
    }
}
