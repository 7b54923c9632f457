//! Grouping keys produced by dimension projections.

use crate::store::{FacultyRecord, Field};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A single key component. Variant order is the sort order: the
/// non-numeric sentinel sorts first, then integers, then text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Missing,
    Int(i64),
    Text(String),
}

impl Scalar {
    pub fn of(record: &FacultyRecord, field: Field) -> Self {
        match record.label(field) {
            Some(label) => Scalar::Text(label.to_string()),
            None => record.number(field).map_or(Scalar::Missing, Scalar::Int),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self { Scalar::Int(v) => Some(*v), _ => None }
    }

    pub fn is_missing(&self) -> bool { matches!(self, Scalar::Missing) }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Missing => write!(f, "NaN"),
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Key of a dimension or group. Scatter dimensions use `Tuple`, group-all uses `All`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Key {
    All,
    Value(Scalar),
    Tuple(SmallVec<[Scalar; 4]>),
}

impl Key {
    pub fn text(s: impl Into<String>) -> Self { Key::Value(Scalar::Text(s.into())) }
    pub fn int(v: i64) -> Self { Key::Value(Scalar::Int(v)) }

    pub fn of(record: &FacultyRecord, field: Field) -> Self {
        Key::Value(Scalar::of(record, field))
    }

    pub fn tuple(record: &FacultyRecord, fields: &[Field]) -> Self {
        Key::Tuple(fields.iter().map(|&f| Scalar::of(record, f)).collect())
    }

    /// The `i`-th component: the scalar itself for `Value` keys (at 0), the
    /// tuple element otherwise.
    pub fn component(&self, i: usize) -> Option<&Scalar> {
        match self {
            Key::All => None,
            Key::Value(s) => (i == 0).then_some(s),
            Key::Tuple(parts) => parts.get(i),
        }
    }

    /// True for keys carrying the non-numeric sentinel in their leading component.
    pub fn is_missing(&self) -> bool {
        self.component(0).map_or(false, Scalar::is_missing)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self { Key::text(s) }
}

impl From<String> for Key {
    fn from(s: String) -> Self { Key::text(s) }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self { Key::int(v) }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::All => write!(f, "all"),
            Key::Value(s) => write!(f, "{}", s),
            Key::Tuple(parts) => {
                write!(f, "(")?;
                for (i, p) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
        }
    }
}
