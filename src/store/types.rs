use serde::{Deserialize, Serialize};

/// Position of a record in the store. Equal to its row order in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct RecordId(pub u32);

impl RecordId {
    #[inline(always)]
    pub fn index(&self) -> usize { self.0 as usize }
    pub fn new(idx: usize) -> Self { Self(idx as u32) }
}

/// The columns every dataset row must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Discipline,
    Sex,
    Rank,
    YrsSincePhd,
    YrsService,
    Salary,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Discipline,
        Field::Sex,
        Field::Rank,
        Field::YrsSincePhd,
        Field::YrsService,
        Field::Salary,
    ];

    /// Header name of the column in the CSV file.
    pub fn column(&self) -> &'static str {
        match self {
            Field::Discipline => "discipline",
            Field::Sex => "sex",
            Field::Rank => "rank",
            Field::YrsSincePhd => "yrs_since_phd",
            Field::YrsService => "yrs_service",
            Field::Salary => "salary",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Field::YrsSincePhd | Field::YrsService | Field::Salary)
    }
}

/// How malformed numeric cells are treated at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseMode {
    /// Leading-digit integer parse; cells without digits become the
    /// non-numeric sentinel (`None`) and the row is kept.
    #[default]
    Permissive,
    /// The whole trimmed cell must be an integer or the load fails.
    Strict,
}

/// One row of the dataset. Immutable once parsed.
///
/// Numeric fields are `None` when the source cell held no number; aggregates
/// over such a field propagate a not-a-number value instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacultyRecord {
    pub discipline: String,
    pub sex: String,
    pub rank: String,
    pub yrs_since_phd: Option<i64>,
    pub yrs_service: Option<i64>,
    pub salary: Option<i64>,
}

impl FacultyRecord {
    /// Categorical value of `field`, or `None` for numeric fields.
    pub fn label(&self, field: Field) -> Option<&str> {
        match field {
            Field::Discipline => Some(self.discipline.as_str()),
            Field::Sex => Some(self.sex.as_str()),
            Field::Rank => Some(self.rank.as_str()),
            _ => None,
        }
    }

    /// Numeric value of `field`. `None` for categorical fields and for
    /// malformed numeric cells.
    pub fn number(&self, field: Field) -> Option<i64> {
        match field {
            Field::YrsSincePhd => self.yrs_since_phd,
            Field::YrsService => self.yrs_service,
            Field::Salary => self.salary,
            _ => None,
        }
    }
}
