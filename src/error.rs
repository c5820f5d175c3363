use std::path::PathBuf;
use thiserror::Error;

/// A recognised file does not have the shape its adapter expects, or a source
/// that should publish incident data has nothing to read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("{file}: sheet `{sheet}` not found")]
    MissingSheet { file: String, sheet: String },

    #[error("{file}: sheet `{sheet}` has no column `{column}`")]
    MissingColumn {
        file: String,
        sheet: String,
        column: String,
    },

    #[error("{source_name}: no incident files found under {}", dir.display())]
    NoSourceFiles { source_name: String, dir: PathBuf },

    #[error("{file}: not a readable workbook")]
    UnsupportedWorkbook { file: String },
}
