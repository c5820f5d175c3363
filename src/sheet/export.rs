// src/sheet/export.rs

use super::Workbook;
use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Write each sheet of `workbook` to `<out_dir>/<stem>_<sheet>.csv`, header
/// row first. Returns the written paths in sheet-name order.
pub fn export_csv(workbook: &Workbook, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating export directory {:?}", out_dir))?;

    let stem = Path::new(&workbook.file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| workbook.file.clone());

    let mut written = Vec::new();
    for sheet in workbook.sheets() {
        let path = out_dir.join(format!("{}_{}.csv", stem, sheet.name));
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("creating {:?}", path))?;

        wtr.write_record(&sheet.headers)?;
        for row in &sheet.rows {
            let fields: Vec<String> = row.iter().map(|c| c.text().unwrap_or_default()).collect();
            wtr.write_record(&fields)?;
        }
        wtr.flush()?;
        info!(sheet = %sheet.name, path = %path.display(), "exported sheet");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Cell;

    #[test]
    fn exports_one_csv_per_sheet() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let wb = Workbook::new("EIR 937.xlsx")
            .with_sheet("Sheet1", &["Inc date", "Town"], vec![vec![Cell::Text("2019".into()), Cell::Empty]])
            .with_sheet("Notes", &[""], vec![]);

        let paths = export_csv(&wb, dir.path())?;
        assert_eq!(paths.len(), 2);
        assert!(paths[1].ends_with("EIR 937_Sheet1.csv"));

        let text = fs::read_to_string(&paths[1])?;
        assert_eq!(text, "Inc date,Town\n2019,\n");
        let notes = fs::read_to_string(&paths[0])?;
        assert_eq!(notes, "Unnamed: 0\n");
        Ok(())
    }
}
