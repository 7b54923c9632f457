//! In-memory record storage for the faculty salary dataset.
pub mod csv;
pub mod error;
pub mod registry;
pub mod types;

pub use error::ParseError;
pub use registry::{RawRow, RecordStore};
pub use types::{FacultyRecord, Field, ParseMode, RecordId};
