use super::csv;
use super::error::ParseError;
use super::types::{FacultyRecord, Field, ParseMode, RecordId};
use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One raw row: column name to cell text.
pub type RawRow = HashMap<String, String>;

/// Owns every parsed record for the lifetime of a session.
/// Read-only after load; insertion order matches the source file.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<FacultyRecord>,
    malformed: usize,
}

impl RecordStore {
    pub fn new() -> Self { Self::default() }

    /// Builds a store directly from already-parsed records.
    pub fn from_records(records: Vec<FacultyRecord>) -> Self {
        Self { records, malformed: 0 }
    }

    /// Parses raw field mappings into records.
    ///
    /// A row lacking one of the required columns always fails. A numeric cell
    /// that holds no integer fails only in `ParseMode::Strict`; permissive
    /// mode stores the non-numeric sentinel and keeps the row.
    pub fn load(rows: &[RawRow], mode: ParseMode) -> Result<Self, ParseError> {
        // Rows are independent; the indexed collect keeps source order, so the
        // error reported is always the one from the earliest failing row.
        let parsed = rows
            .par_iter()
            .enumerate()
            .map(|(i, row)| parse_row(i + 1, row, mode))
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;

        let malformed = parsed.iter().filter(|(_, bad)| *bad > 0).count();
        let records: Vec<FacultyRecord> = parsed.into_iter().map(|(rec, _)| rec).collect();

        info!(records = records.len(), malformed_rows = malformed, "Loaded faculty dataset");
        Ok(Self { records, malformed })
    }

    /// Parses CSV text with a header row. Columns not used by the dashboard are ignored.
    pub fn from_csv_str(input: &str, mode: ParseMode) -> Result<Self, ParseError> {
        let mut lines = csv::split_records(input).into_iter();
        let header: Vec<String> = lines
            .next()
            .ok_or(ParseError::EmptyInput)?
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        for field in Field::ALL {
            if !header.iter().any(|h| h == field.column()) {
                return Err(ParseError::MissingColumn { column: field.column().to_string() });
            }
        }

        // Short rows simply omit the trailing columns; `load` reports them.
        let rows: Vec<RawRow> = lines
            .map(|cells| header.iter().cloned().zip(cells).collect())
            .collect();

        Self::load(&rows, mode)
    }

    pub fn from_reader<R: Read>(mut reader: R, mode: ParseMode) -> Result<Self, ParseError> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_csv_str(&buf, mode)
    }

    /// Loads the dataset file. An unreadable file is an error, never an empty store.
    pub fn load_csv(path: impl AsRef<Path>, mode: ParseMode) -> Result<Self, ParseError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_csv_str(&text, mode)
    }

    pub fn all(&self) -> &[FacultyRecord] { &self.records }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    #[inline(always)]
    pub fn get(&self, id: RecordId) -> Option<&FacultyRecord> {
        self.records.get(id.index())
    }

    /// Number of rows kept with at least one non-numeric sentinel.
    pub fn malformed_count(&self) -> usize { self.malformed }

    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        (0..self.records.len()).map(RecordId::new)
    }
}

/// Returns the record plus the number of numeric cells that fell back to the sentinel.
fn parse_row(row: usize, raw: &RawRow, mode: ParseMode) -> Result<(FacultyRecord, usize), ParseError> {
    let cell = |field: Field| {
        raw.get(field.column())
            .map(String::as_str)
            .ok_or_else(|| ParseError::MissingField { row, column: field.column().to_string() })
    };

    let mut malformed = 0;
    let mut number = |field: Field| -> Result<Option<i64>, ParseError> {
        let text = cell(field)?;
        let value = match mode {
            ParseMode::Permissive => parse_int_prefix(text),
            ParseMode::Strict => Some(text.trim().parse::<i64>().map_err(|_| ParseError::InvalidNumber {
                row,
                column: field.column().to_string(),
                value: text.to_string(),
            })?),
        };
        if value.is_none() {
            malformed += 1;
        }
        Ok(value)
    };

    let yrs_since_phd = number(Field::YrsSincePhd)?;
    let yrs_service = number(Field::YrsService)?;
    let salary = number(Field::Salary)?;

    if malformed > 0 {
        warn!(row, malformed, "Row has non-numeric values; keeping it with a sentinel");
    }

    let record = FacultyRecord {
        discipline: cell(Field::Discipline)?.to_string(),
        sex: cell(Field::Sex)?.to_string(),
        rank: cell(Field::Rank)?.to_string(),
        yrs_since_phd,
        yrs_service,
        salary,
    };
    Ok((record, malformed))
}

/// Integer parse over the longest numeric prefix: leading whitespace, an
/// optional sign, then digits. `"12abc"` is 12, `"3.9"` is 3, `"abc"` is `None`.
pub(crate) fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    const SAMPLE: &str = "\"\",\"rank\",\"discipline\",\"yrs_since_phd\",\"yrs_service\",\"sex\",\"salary\"\n\
        \"1\",\"Prof\",\"B\",19,18,\"Male\",139750\n\
        \"2\",\"AsstProf\",\"A\",4,3,\"Female\",79750\n\
        \"3\",\"AssocProf\",\"B\",12,n/a,\"Male\",101000\n";

    #[rstest]
    #[case("42", Some(42))]
    #[case("  7", Some(7))]
    #[case("-3", Some(-3))]
    #[case("+5", Some(5))]
    #[case("12abc", Some(12))]
    #[case("3.9", Some(3))]
    #[case("", None)]
    #[case("n/a", None)]
    #[case("-", None)]
    fn test_int_prefix_parse(#[case] input: &str, #[case] expected: Option<i64>) {
        assert_eq!(parse_int_prefix(input), expected);
    }

    #[test]
    fn test_csv_preserves_order_and_ignores_extra_columns() {
        let store = RecordStore::from_csv_str(SAMPLE, ParseMode::Permissive).unwrap();
        assert_eq!(store.len(), 3);
        let ranks: Vec<&str> = store.all().iter().map(|r| r.rank.as_str()).collect();
        assert_eq!(ranks, vec!["Prof", "AsstProf", "AssocProf"]);
        assert_eq!(store.all()[0].salary, Some(139750));
        assert_eq!(store.all()[1].sex, "Female");
    }

    #[test]
    fn test_permissive_mode_keeps_row_with_sentinel() {
        let store = RecordStore::from_csv_str(SAMPLE, ParseMode::Permissive).unwrap();
        let third = store.get(RecordId::new(2)).unwrap();
        assert_eq!(third.yrs_service, None);
        assert_eq!(third.salary, Some(101000));
        assert_eq!(store.malformed_count(), 1);
    }

    #[test]
    fn test_strict_mode_rejects_non_numeric_cell() {
        let err = RecordStore::from_csv_str(SAMPLE, ParseMode::Strict).unwrap_err();
        match err {
            ParseError::InvalidNumber { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "yrs_service");
                assert_eq!(value, "n/a");
            }
            other => panic!("Wrong error type: {:?}", other),
        }
    }

    #[test]
    fn test_strict_mode_reports_earliest_bad_row() {
        let mut input = String::from("rank,discipline,yrs_since_phd,yrs_service,sex,salary\n");
        for i in 0..200 {
            let salary = if i % 50 == 7 { "x".to_string() } else { (50000 + i).to_string() };
            input.push_str(&format!("Prof,A,{},{},Male,{}\n", i, i, salary));
        }
        for _ in 0..5 {
            let err = RecordStore::from_csv_str(&input, ParseMode::Strict).unwrap_err();
            assert!(matches!(err, ParseError::InvalidNumber { row: 8, .. }), "{:?}", err);
        }
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = RecordStore::from_csv_str("rank,discipline,sex,salary\nProf,A,Male,1\n", ParseMode::Permissive)
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn { ref column } if column == "yrs_since_phd"));
    }

    #[test]
    fn test_short_row_is_missing_field() {
        let input = "rank,discipline,yrs_since_phd,yrs_service,sex,salary\nProf,A,1,1,Male\n";
        let err = RecordStore::from_csv_str(input, ParseMode::Permissive).unwrap_err();
        assert!(matches!(err, ParseError::MissingField { row: 1, ref column } if column == "salary"));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(RecordStore::from_csv_str("", ParseMode::Permissive), Err(ParseError::EmptyInput)));
    }

    #[test]
    fn test_load_from_raw_rows() {
        let row: RawRow = [
            ("discipline", "A"),
            ("sex", "Female"),
            ("rank", "Prof"),
            ("yrs_since_phd", "20"),
            ("yrs_service", "15"),
            ("salary", "90000"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let store = RecordStore::load(&[row], ParseMode::Strict).unwrap();
        assert_eq!(store.all()[0].yrs_service, Some(15));
    }

    #[test]
    fn test_load_csv_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let store = RecordStore::load_csv(file.path(), ParseMode::Permissive).unwrap();
        assert_eq!(store.len(), 3);

        let dir = tempfile::tempdir().unwrap();
        let missing = RecordStore::load_csv(dir.path().join("nope.csv"), ParseMode::Permissive);
        assert!(matches!(missing, Err(ParseError::Io(_))));
    }
}
