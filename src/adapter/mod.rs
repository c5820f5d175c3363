// src/adapter/mod.rs
//! The contract every source implements, and the machinery that drives it.
//!
//! A source is described by the files it publishes: each recognised relative
//! path maps to a plain reader function (`ShapeFn`) for that file's layout.
//! Column drift between releases is handled by registering another shape,
//! never by fuzzy header matching.

pub mod registry;
pub mod sources;

use crate::error::StructuralError;
use crate::process::{DateStandardizer, StandardizedDate};
use crate::record::{CanonicalRecord, IncidentDate, IncidentType, Location};
use crate::report::{Report, Warning};
use crate::sheet::{Cell, Workbook};
use crate::store::RecordAccumulator;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub use registry::SourceRegistry;

/// Reads one file layout and emits records into the context.
pub type ShapeFn = fn(&Workbook, &mut ShapeContext<'_>) -> Result<()>;

#[derive(Clone, Copy)]
pub enum ShapeKind {
    /// Incident-level data, read by the given function.
    Incidents(ShapeFn),
    /// A known summary-only file. Recognised so it is not reported as
    /// unknown, but never read.
    Aggregated,
}

/// A file a source is known to publish, by path relative to the source's
/// directory (always `/`-separated).
#[derive(Clone, Copy)]
pub struct FileShape {
    pub path: &'static str,
    pub kind: ShapeKind,
}

impl FileShape {
    pub const fn incidents(path: &'static str, read: ShapeFn) -> Self {
        Self {
            path,
            kind: ShapeKind::Incidents(read),
        }
    }

    pub const fn aggregated(path: &'static str) -> Self {
        Self {
            path,
            kind: ShapeKind::Aggregated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Publishes incident rows; finding none of its files is an error.
    Incidents,
    /// Only ever publishes aggregated statistics; an empty result is expected.
    AggregatedOnly,
}

/// Everything a shape reader needs while walking one file's rows.
pub struct ShapeContext<'a> {
    file: &'a str,
    dates: DateStandardizer,
    out: &'a mut RecordAccumulator,
    report: &'a mut Report,
}

impl<'a> ShapeContext<'a> {
    pub fn new(file: &'a str, out: &'a mut RecordAccumulator, report: &'a mut Report) -> Self {
        Self {
            file,
            dates: DateStandardizer,
            out,
            report,
        }
    }

    pub fn file(&self) -> &str {
        self.file
    }

    fn settle(&mut self, d: StandardizedDate) -> Option<IncidentDate> {
        match d {
            StandardizedDate::Known(d) => Some(d),
            StandardizedDate::Missing => None,
            StandardizedDate::Unparseable(raw) => {
                self.report.push(Warning::UnparseableDate {
                    file: self.file.to_string(),
                    raw,
                });
                None
            }
        }
    }

    pub fn date(&mut self, cell: &Cell) -> Option<IncidentDate> {
        let d = self.dates.standardize(cell);
        self.settle(d)
    }

    /// `YYYYMMDD` cells, falling back to the general formats.
    pub fn compact_date(&mut self, cell: &Cell) -> Option<IncidentDate> {
        let d = self.dates.standardize_compact(cell);
        self.settle(d)
    }

    /// Spreadsheet serial day numbers, falling back to the general formats.
    pub fn serial_date(&mut self, cell: &Cell) -> Option<IncidentDate> {
        let d = self.dates.standardize_serial(cell);
        self.settle(d)
    }

    pub fn emit(
        &mut self,
        incident_date: Option<IncidentDate>,
        incident_type: Option<IncidentType>,
        location: Location,
    ) {
        let record = CanonicalRecord::new(
            self.out.source_name(),
            incident_date,
            incident_type,
            location,
        );
        self.out.add(record);
    }
}

fn relative_label(dir: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(dir).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Dot-prefixed files or directories and `~$` lock files, anywhere below `dir`.
fn is_hidden(dir: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(dir).unwrap_or(path);
    rel.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        (name.starts_with('.') && name != "." && name != "..") || name.starts_with("~$")
    })
}

/// One organisation's way of publishing incident data.
pub trait SourceAdapter: Send + Sync {
    /// Canonical source name written into every record.
    fn name(&self) -> &'static str;

    /// Directory holding this source's files, relative to the source root.
    fn dir_name(&self) -> &'static str {
        self.name()
    }

    fn granularity(&self) -> Granularity {
        Granularity::Incidents
    }

    /// Recognised files, matched by exact relative path.
    fn shapes(&self) -> &'static [FileShape];

    /// Run every recognised file in `files` (paths under `dir`) through its
    /// shape reader, in the order given.
    ///
    /// Unknown files are reported and skipped. A recognised file missing a
    /// sheet or column fails the whole source.
    #[tracing::instrument(level = "info", skip_all, fields(source = self.name()))]
    fn process(
        &self,
        dir: &Path,
        files: &[PathBuf],
        report: &mut Report,
    ) -> Result<RecordAccumulator> {
        let mut acc = RecordAccumulator::new(self.name());

        if self.granularity() == Granularity::AggregatedOnly {
            info!("source publishes aggregated statistics only; nothing to extract");
            return Ok(acc);
        }

        let mut recognised = 0usize;
        for path in files {
            if is_hidden(dir, path) {
                continue;
            }
            let label = relative_label(dir, path);
            let Some(shape) = self.shapes().iter().find(|s| s.path == label) else {
                report.push(Warning::SkippedFile { file: label });
                continue;
            };
            let read = match shape.kind {
                ShapeKind::Aggregated => {
                    report.push(Warning::AggregatedFile { file: label });
                    continue;
                }
                ShapeKind::Incidents(read) => read,
            };

            recognised += 1;
            info!(file = %label, "processing file");
            let book = Workbook::open(path)
                .with_context(|| format!("{}: loading {}", self.name(), label))?;
            let before = acc.len();
            let mut ctx = ShapeContext::new(&label, &mut acc, report);
            read(&book, &mut ctx).with_context(|| format!("{}: processing {}", self.name(), label))?;
            info!(file = %label, rows = acc.len() - before, "extracted records");
        }

        if recognised == 0 {
            return Err(StructuralError::NoSourceFiles {
                source_name: self.name().to_string(),
                dir: dir.to_path_buf(),
            }
            .into());
        }
        Ok(acc)
    }
}
