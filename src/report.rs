use serde::Serialize;
use tracing::{info, warn};

/// One advisory finding. None of these change control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A file in the source directory that no adapter shape claims.
    SkippedFile { file: String },
    /// A known summary-only file, deliberately not read.
    AggregatedFile { file: String },
    /// A date cell that could not be standardized.
    UnparseableDate { file: String, raw: String },
    /// Flush was asked to persist zero records.
    EmptyFlush,
}

/// Per-source collector of advisory warnings, handed explicitly to each
/// adapter run. Every entry is also emitted as a tracing event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    source: String,
    warnings: Vec<Warning>,
}

impl Report {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            warnings: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn push(&mut self, w: Warning) {
        match &w {
            Warning::SkippedFile { file } => {
                warn!(source = %self.source, file = %file, "skipping unknown file")
            }
            Warning::AggregatedFile { file } => {
                info!(source = %self.source, file = %file, "skipping aggregated summary file")
            }
            Warning::UnparseableDate { file, raw } => {
                warn!(source = %self.source, file = %file, raw = %raw, "date standardization failed")
            }
            Warning::EmptyFlush => warn!(source = %self.source, "no records to save"),
        }
        self.warnings.push(w);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn count<F: Fn(&Warning) -> bool>(&self, pred: F) -> usize {
        self.warnings.iter().filter(|w| pred(w)).count()
    }
}
