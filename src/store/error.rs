//! Errors raised while turning raw rows into `FacultyRecord`s.
use thiserror::Error;

/// Row numbers are 1-based and count data rows only (the header is not a row).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Input has no header row")]
    EmptyInput,
    #[error("Required column '{column}' is missing from the header")]
    MissingColumn { column: String },
    #[error("Row {row} has no value for column '{column}'")]
    MissingField { row: usize, column: String },
    #[error("Row {row}: '{value}' in column '{column}' is not an integer")]
    InvalidNumber { row: usize, column: String, value: String },
    #[error("Could not read dataset: {0}")]
    Io(#[from] std::io::Error),
}
