use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column name holding the structural identity of a stats row.
pub const SEG_ID_COLUMN: &str = "SegId";

/// Column name holding the label identity of a stats row.
pub const STRUCT_NAME_COLUMN: &str = "StructName";

/// One cell of a statistics table or one field of a measure annotation.
///
/// Numeric comparison across Int and Float is allowed; Text compares
/// exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Numeric view of the cell, None for text cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

/// One row of a statistics table: an ordered column → value mapping.
///
/// Every row carries a `SegId` column (structural identity) and usually
/// a `StructName` column (label identity).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsRow {
    columns: Vec<(String, CellValue)>,
}

impl StatsRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, CellValue)>,
        K: Into<String>,
    {
        Self {
            columns: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Set a column, replacing an existing value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        if let Some(slot) = self.columns.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.columns.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.columns.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Columns in table order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// The row's `SegId`. Absent or non-integer SegId is a data error.
    pub fn seg_id(&self) -> Result<i64> {
        match self.get(SEG_ID_COLUMN) {
            Some(cell) => cell
                .as_i64()
                .ok_or_else(|| Error::MissingColumn(format!("{} is not an integer", SEG_ID_COLUMN))),
            None => Err(Error::MissingColumn(SEG_ID_COLUMN.to_string())),
        }
    }

    /// The row's `StructName`, when present and textual.
    pub fn struct_name(&self) -> Option<&str> {
        self.get(STRUCT_NAME_COLUMN).and_then(CellValue::as_str)
    }
}

impl fmt::Display for StatsRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// A scalar summary annotation attached to a stats file.
///
/// Fields are positional: display name, description, value, unit,
/// then optional extras. Two measures are meta-equal when every field
/// except the value matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure(pub Vec<CellValue>);

impl Measure {
    /// Position of the raw value within the field tuple.
    pub const VALUE_FIELD: usize = 2;

    /// A measure entry is well-formed when it is tuple-shaped with a
    /// numeric value in the value position.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() > Self::VALUE_FIELD && self.value().is_some()
    }

    /// The raw numeric value, None when absent or non-numeric.
    pub fn value(&self) -> Option<f64> {
        self.0.get(Self::VALUE_FIELD).and_then(CellValue::as_f64)
    }

    /// All fields with the value position masked out.
    ///
    /// Equality over this view ignores the raw value, so metadata
    /// comparison is independent of the numeric tolerance check.
    pub fn meta_fields(&self) -> Vec<Option<&CellValue>> {
        self.0
            .iter()
            .enumerate()
            .map(|(i, field)| (i != Self::VALUE_FIELD).then_some(field))
            .collect()
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, ")")
    }
}

/// A parsed statistics file: measure annotations plus the row table,
/// rows kept in file order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsTable {
    #[serde(default)]
    pub annotations: BTreeMap<String, Measure>,
    #[serde(default)]
    pub rows: Vec<StatsRow>,
}

impl StatsTable {
    pub fn measure(&self, name: &str) -> Option<&Measure> {
        self.annotations.get(name)
    }
}
