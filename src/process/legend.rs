use crate::sheet::{Cell, Sheet};
use crate::error::StructuralError;
use std::collections::HashMap;

/// Description returned for any code the legend does not know.
pub const UNKNOWN: &str = "Unknown";

/// Column of a headerless `Legend` sheet holding `"<code> - <description>"`
/// entries, as named by the sheet reader.
pub const LEGEND_COLUMN: &str = "Unnamed: 0";

const SEPARATOR: &str = " - ";

/// Code → description lookup built from one file's reference sheet.
///
/// Code meanings are file-specific, so a table is built per file and dropped
/// with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegendTable {
    codes: HashMap<String, String>,
}

impl LegendTable {
    /// Scan cells for `"<code> - <description>"` entries, splitting on the
    /// first separator. Cells without the separator, or with an empty code or
    /// description, are annotation rows and contribute nothing.
    pub fn build<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let mut codes = HashMap::new();
        for cell in cells {
            let Some(text) = cell.text() else { continue };
            let Some((code, desc)) = text.split_once(SEPARATOR) else {
                continue;
            };
            let (code, desc) = (code.trim(), desc.trim());
            if code.is_empty() || desc.is_empty() {
                continue;
            }
            codes.insert(code.to_string(), desc.to_string());
        }
        Self { codes }
    }

    /// Build from the designated column of a reference sheet.
    pub fn from_sheet(sheet: &Sheet, column: &str) -> Result<Self, StructuralError> {
        let [col] = sheet.require([column])?;
        Ok(Self::build(sheet.rows.iter().filter_map(|r| r.get(col))))
    }

    /// A fixed legend for sources that publish their codes out of band.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            codes: pairs
                .iter()
                .map(|(c, d)| (c.to_string(), d.to_string()))
                .collect(),
        }
    }

    /// Mapped description for an exact code match, else [`UNKNOWN`].
    pub fn resolve(&self, code: Option<&str>) -> &str {
        code.and_then(|c| self.codes.get(c))
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    pub fn resolve_cell(&self, code: &Cell) -> String {
        self.resolve(code.text().as_deref()).to_string()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Workbook;

    fn cells(items: &[&str]) -> Vec<Cell> {
        items.iter().map(|s| Cell::Text(s.to_string())).collect()
    }

    #[test]
    fn resolves_known_and_unknown_codes() {
        let table = LegendTable::build(&cells(&["A1 - Foo", "A2 - Bar"]));
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve(Some("A1")), "Foo");
        assert_eq!(table.resolve(Some("A3")), UNKNOWN);
        assert_eq!(table.resolve(None), UNKNOWN);
        assert_eq!(table.resolve(Some("")), UNKNOWN);
    }

    #[test]
    fn annotation_rows_are_skipped() {
        let table = LegendTable::build(&[
            Cell::Text("not a mapping row".into()),
            Cell::Empty,
            Cell::Int(7),
            Cell::Text("B1 - ".into()),
            Cell::Text(" - orphan".into()),
        ]);
        assert!(table.is_empty());
    }

    #[test]
    fn splits_on_first_separator_only() {
        let table = LegendTable::build(&cells(&["  C7 - Pipe - collapsed  "]));
        assert_eq!(table.resolve(Some("C7")), "Pipe - collapsed");
    }

    #[test]
    fn numeric_codes_match_their_text() {
        let table = LegendTable::build(&cells(&["12 - Roots"]));
        assert_eq!(table.resolve_cell(&Cell::Float(12.0)), "Roots");
        assert_eq!(table.resolve_cell(&Cell::Empty), UNKNOWN);
    }

    #[test]
    fn from_sheet_reads_unnamed_first_column() {
        let wb = Workbook::new("l.xlsx").with_sheet(
            "Legend",
            &["", "Notes"],
            vec![
                vec!["Cause codes".into(), Cell::Empty],
                vec!["X1 - Leak".into(), "see manual".into()],
            ],
        );
        let sheet = wb.sheet("Legend").unwrap();
        let table = LegendTable::from_sheet(sheet, "Unnamed: 0").unwrap();
        assert_eq!(table.resolve(Some("X1")), "Leak");
        assert!(LegendTable::from_sheet(sheet, "Code").is_err());
    }
}
