// src/sheet/mod.rs

pub mod export;
pub mod read;

use crate::error::StructuralError;
use crate::process::utils::clean_str;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

pub use export::export_csv;

/// One spreadsheet cell, already detached from the reader that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Missing-value sentinel: an empty cell or text that is blank once trimmed.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Trimmed textual form, or `None` for a missing cell.
    ///
    /// Integral floats render without a fractional part so that codes stored
    /// as numbers (`12.0`) compare equal to their legend text (`"12"`).
    pub fn text(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        Some(match self {
            Cell::Empty => return None,
            Cell::Text(s) => clean_str(s),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Cell::Float(f) => f.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.date().format("%Y-%m-%d").to_string(),
        })
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Cell::Float(f)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(dt: NaiveDateTime) -> Self {
        Cell::DateTime(dt)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Cell::Empty)
    }
}

/// A named sheet: a header row plus data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    /// File the sheet came from, for error messages.
    pub file: String,
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    index: HashMap<String, usize>,
}

impl Sheet {
    /// Build a sheet from a raw header row and data rows.
    ///
    /// Blank headers become `Unnamed: <i>` and repeated headers get `.1`,
    /// `.2`, ... suffixes, so every column has a unique, addressable name.
    pub fn new(
        file: impl Into<String>,
        name: impl Into<String>,
        raw_headers: Vec<String>,
        rows: Vec<Vec<Cell>>,
    ) -> Self {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut headers = Vec::with_capacity(raw_headers.len());
        for (i, h) in raw_headers.into_iter().enumerate() {
            let base = if h.trim().is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h
            };
            let n = seen.entry(base.clone()).or_insert(0);
            let header = if *n == 0 {
                base
            } else {
                format!("{}.{}", base, n)
            };
            *n += 1;
            headers.push(header);
        }
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Self {
            file: file.into(),
            name: name.into(),
            headers,
            rows,
            index,
        }
    }

    fn missing(&self, column: &str) -> StructuralError {
        StructuralError::MissingColumn {
            file: self.file.clone(),
            sheet: self.name.clone(),
            column: column.to_string(),
        }
    }

    /// Resolve every named column to its index, or fail on the first absent one.
    pub fn require<const N: usize>(&self, names: [&str; N]) -> Result<[usize; N], StructuralError> {
        let mut out = [0usize; N];
        for (slot, name) in out.iter_mut().zip(names) {
            *slot = *self.index.get(name).ok_or_else(|| self.missing(name))?;
        }
        Ok(out)
    }

    /// Like [`Sheet::require`], but compares headers after trimming whitespace.
    pub fn require_trimmed<const N: usize>(
        &self,
        names: [&str; N],
    ) -> Result<[usize; N], StructuralError> {
        let mut out = [0usize; N];
        for (slot, name) in out.iter_mut().zip(names) {
            *slot = self
                .headers
                .iter()
                .position(|h| h.trim() == name.trim())
                .ok_or_else(|| self.missing(name))?;
        }
        Ok(out)
    }

    /// Data rows, skipping rows where every cell is missing.
    pub fn records(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows
            .iter()
            .filter(|r| !r.iter().all(Cell::is_missing))
            .map(|cells| Row { cells })
    }
}

/// Borrowed view of one data row. Out-of-range reads yield [`Cell::Empty`],
/// since spreadsheet readers trim trailing empty cells.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    cells: &'a [Cell],
}

static EMPTY: Cell = Cell::Empty;

impl<'a> Row<'a> {
    pub fn cell(&self, idx: usize) -> &'a Cell {
        self.cells.get(idx).unwrap_or(&EMPTY)
    }

    pub fn text(&self, idx: usize) -> Option<String> {
        self.cell(idx).text()
    }
}

/// All sheets of one spreadsheet file, keyed by sheet name.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub file: String,
    sheets: BTreeMap<String, Sheet>,
}

impl Workbook {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            sheets: BTreeMap::new(),
        }
    }

    /// Add a sheet built from raw headers and rows (used by readers and tests).
    pub fn with_sheet(mut self, name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        let sheet = Sheet::new(
            self.file.clone(),
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows,
        );
        self.sheets.insert(name.to_string(), sheet);
        self
    }

    pub fn insert(&mut self, sheet: Sheet) {
        self.sheets.insert(sheet.name.clone(), sheet);
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet, StructuralError> {
        self.sheets
            .get(name)
            .ok_or_else(|| StructuralError::MissingSheet {
                file: self.file.clone(),
                sheet: name.to_string(),
            })
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.values()
    }
}
