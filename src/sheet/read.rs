// src/sheet/read.rs

use super::{Cell, Sheet, Workbook};
use crate::error::StructuralError;
use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use std::path::Path;
use tracing::debug;

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// True when the path has an extension the workbook reader understands.
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => Cell::DateTime(ndt),
            None => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(Cell::DateTime)
            .unwrap_or_else(|_| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

/// Split a sheet's used range into its header row and data rows.
///
/// The reader's range begins at the first used cell, which drops leading
/// blank rows but also leading blank columns. Columns are padded back so
/// index 0 is always column A and a blank `A1` still names `Unnamed: 0`.
fn split_range(range: &Range<Data>) -> (Vec<String>, Vec<Vec<Cell>>) {
    let pad = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let mut rows = range.rows().map(|r| {
        std::iter::repeat(Cell::Empty)
            .take(pad)
            .chain(r.iter().map(convert))
            .collect::<Vec<_>>()
    });
    let headers = rows
        .next()
        .map(|r| r.iter().map(|c| c.text().unwrap_or_default()).collect())
        .unwrap_or_default();
    (headers, rows.collect())
}

impl Workbook {
    /// Load every sheet of a spreadsheet file into memory. The first
    /// non-blank row of each sheet is taken as its header row.
    #[tracing::instrument(level = "debug", skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        if !is_workbook(path) {
            return Err(StructuralError::UnsupportedWorkbook { file: label }.into());
        }

        let mut book = open_workbook_auto(path)
            .with_context(|| format!("Failed to open workbook: {:?}", path))?;

        let mut wb = Workbook::new(label.clone());
        for name in book.sheet_names() {
            let range = book
                .worksheet_range(&name)
                .with_context(|| format!("Failed to read sheet `{}` in {}", name, label))?;

            let (headers, data) = split_range(&range);

            debug!(sheet = %name, rows = data.len(), cols = headers.len(), "loaded sheet");
            wb.insert(Sheet::new(label.clone(), name, headers, data));
        }
        Ok(wb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn recognises_workbook_extensions() {
        assert!(is_workbook(&PathBuf::from("a/EIR 937.xlsx")));
        assert!(is_workbook(&PathBuf::from("EIR-380.XLSB")));
        assert!(!is_workbook(&PathBuf::from("notes.txt")));
        assert!(!is_workbook(&PathBuf::from("README")));
    }

    #[test]
    fn opening_a_non_workbook_is_structural() {
        let err = Workbook::open("notes.txt").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StructuralError>(),
            Some(StructuralError::UnsupportedWorkbook { .. })
        ));
    }

    #[test]
    fn columns_stay_anchored_at_a_when_leading_cells_are_blank() {
        // used range B2:C3
        let mut range = Range::new((1, 1), (2, 2));
        range.set_value((1, 1), Data::String("Code".into()));
        range.set_value((2, 1), Data::String("X1 - Leak".into()));
        range.set_value((2, 2), Data::Int(7));

        let (headers, rows) = split_range(&range);
        assert_eq!(headers, vec!["", "Code", ""]);
        assert_eq!(
            rows,
            vec![vec![Cell::Empty, Cell::Text("X1 - Leak".into()), Cell::Int(7)]]
        );

        let sheet = Sheet::new("l.xlsx", "Legend", headers, rows);
        assert_eq!(sheet.headers, vec!["Unnamed: 0", "Code", "Unnamed: 2"]);
    }

    #[test]
    fn empty_sheet_has_no_headers() {
        let (headers, rows) = split_range(&Range::<Data>::empty());
        assert!(headers.is_empty());
        assert!(rows.is_empty());
    }

    #[test]
    fn converts_reader_cells() {
        assert_eq!(convert(&Data::Empty), Cell::Empty);
        assert_eq!(convert(&Data::Int(4)), Cell::Int(4));
        assert_eq!(convert(&Data::String("x".into())), Cell::Text("x".into()));
        assert!(matches!(
            convert(&Data::DateTimeIso("2021-04-05T00:00:00".into())),
            Cell::DateTime(_)
        ));
    }
}
