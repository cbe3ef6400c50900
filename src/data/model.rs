use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::Serialize;

use crate::engine::columns;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the census table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64`. Text, booleans and nulls yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if v.is_nan() => None,
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Canonical text used when matching names and codes.
    ///
    /// Integral floats print without a fraction, so a code stored as
    /// `3304557005.0` by a spreadsheet export still matches `"3304557005"`.
    pub fn key_text(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                format!("{}", *v as i64)
            }
            CellValue::Float(v) => v.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }

    /// Infer the type of a raw text cell.
    ///
    /// Surrounding whitespace is ignored when parsing numbers and booleans,
    /// but text cells keep their exact content. Empty and all-blank cells
    /// are `Null`.
    pub fn infer(s: &str) -> CellValue {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }
        if trimmed == "true" || trimmed == "false" {
            return CellValue::Bool(trimmed == "true");
        }
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// RawRecord – one neighborhood row
// ---------------------------------------------------------------------------

/// One row of the source table. Cells are positional and line up with
/// [`Dataset::columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub cells: Vec<CellValue>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table. Column order is the source header order.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<RawRecord>,
}

impl Dataset {
    /// Build a dataset from a header and its rows.
    ///
    /// Rows shorter than the header are padded with nulls, longer rows are
    /// truncated. On duplicated header names the first occurrence wins.
    pub fn new(columns: Vec<String>, records: Vec<RawRecord>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(i);
        }
        let width = columns.len();
        let records = records
            .into_iter()
            .map(|mut r| {
                r.cells.resize(width, CellValue::Null);
                r
            })
            .collect();
        Dataset {
            columns,
            index,
            records,
        }
    }

    /// Column names, verbatim and in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Cell at `row` for column `name`; `None` when the column does not exist.
    pub fn cell(&self, row: usize, name: &str) -> Option<&CellValue> {
        let col = self.column_index(name)?;
        self.records.get(row).and_then(|r| r.cells.get(col))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Neighborhood name of a row (`NM_BAIRRO`).
    pub fn name_of(&self, row: usize) -> String {
        self.cell(row, columns::NAME)
            .map(CellValue::key_text)
            .unwrap_or_default()
    }

    /// Neighborhood code of a row (`CD_BAIRRO`).
    pub fn code_of(&self, row: usize) -> String {
        self.cell(row, columns::CODE)
            .map(CellValue::key_text)
            .unwrap_or_default()
    }

    /// Sorted unique neighborhood names, i.e. the options a filter offers.
    pub fn neighborhood_names(&self) -> BTreeSet<String> {
        (0..self.len())
            .map(|row| self.name_of(row))
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Sorted unique neighborhood codes.
    pub fn neighborhood_codes(&self) -> BTreeSet<String> {
        (0..self.len())
            .map(|row| self.code_of(row))
            .filter(|code| !code.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_cell_types() {
        assert_eq!(CellValue::infer("42"), CellValue::Integer(42));
        assert_eq!(CellValue::infer(" 1.5 "), CellValue::Float(1.5));
        assert_eq!(CellValue::infer(""), CellValue::Null);
        assert_eq!(CellValue::infer("true"), CellValue::Bool(true));
        assert_eq!(
            CellValue::infer("Centro"),
            CellValue::String("Centro".into())
        );
    }

    #[test]
    fn text_cells_keep_their_whitespace() {
        assert_eq!(
            CellValue::infer("Centro "),
            CellValue::String("Centro ".into())
        );
        assert_eq!(CellValue::infer(" 1000 "), CellValue::Integer(1000));
        assert_eq!(CellValue::infer("   "), CellValue::Null);
        assert_eq!(CellValue::infer("Centro ").key_text(), "Centro ");
    }

    #[test]
    fn key_text_drops_integral_fraction() {
        assert_eq!(CellValue::Float(3304557005.0).key_text(), "3304557005");
        assert_eq!(CellValue::Float(2.5).key_text(), "2.5");
        assert_eq!(CellValue::Integer(7).key_text(), "7");
    }

    #[test]
    fn nan_is_not_numeric() {
        assert_eq!(CellValue::Float(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::String("12".into()).as_f64(), None);
    }

    #[test]
    fn pads_short_rows_and_keeps_column_order() {
        let ds = Dataset::new(
            vec!["NM_BAIRRO".into(), "b".into(), "a".into()],
            vec![RawRecord {
                cells: vec![CellValue::String("Centro".into())],
            }],
        );
        assert_eq!(ds.columns(), ["NM_BAIRRO", "b", "a"]);
        assert_eq!(ds.cell(0, "a"), Some(&CellValue::Null));
        assert_eq!(ds.cell(0, "missing"), None);
        assert_eq!(ds.name_of(0), "Centro");
    }
}
