// src/store/mod.rs

pub mod arrow;

use crate::record::CanonicalRecord;
use crate::report::{Report, Warning};
use anyhow::{Context, Result};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};
use tracing::info;

pub use self::arrow::{batch_to_records, canonical_schema, records_to_batch};

/// Ordered, append-only buffer of one source's records.
#[derive(Debug, Clone)]
pub struct RecordAccumulator {
    source_name: String,
    records: Vec<CanonicalRecord>,
}

impl RecordAccumulator {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            records: Vec::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn add(&mut self, record: CanonicalRecord) {
        debug_assert_eq!(record.source_name(), self.source_name);
        self.records.push(record);
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.records
    }
}

/// Directory of per-source Parquet artifacts.
#[derive(Debug, Clone)]
pub struct NormalizedStore {
    dir: PathBuf,
}

impl NormalizedStore {
    /// Open the store at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating results directory {:?}", &dir))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<source_name>_incidents.parquet`
    pub fn artifact_path(&self, source_name: &str) -> PathBuf {
        self.dir.join(format!("{}_incidents.parquet", source_name))
    }

    /// Delete the source's artifact from a previous run, if there is one.
    /// Returns whether a file was removed.
    pub fn remove_artifact(&self, source_name: &str) -> Result<bool> {
        let path = self.artifact_path(source_name);
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(source = %source_name, path = %path.display(), "removed stale artifact");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing stale artifact {:?}", path)),
        }
    }

    /// Persist `records` as the source's artifact, replacing any previous one.
    ///
    /// The file is written beside its final path and renamed into place, so
    /// either a complete artifact exists or none was written. Zero records
    /// writes nothing, removes any previous artifact and returns `None`.
    #[tracing::instrument(level = "info", skip(self, records, report), fields(rows = records.len()))]
    pub fn flush(
        &self,
        source_name: &str,
        records: &[CanonicalRecord],
        report: &mut Report,
    ) -> Result<Option<PathBuf>> {
        if records.is_empty() {
            report.push(Warning::EmptyFlush);
            self.remove_artifact(source_name)?;
            return Ok(None);
        }

        let path = self.artifact_path(source_name);
        let tmp = path.with_extension("parquet.tmp");

        if let Err(e) = write_parquet(&tmp, records) {
            let _ = fs::remove_file(&tmp);
            return Err(e.context(format!("writing artifact for {}", source_name)));
        }
        fs::rename(&tmp, &path)
            .with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;

        info!(source = %source_name, rows = records.len(), path = %path.display(), "saved records");
        Ok(Some(path))
    }
}

fn write_parquet(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    let batch = records_to_batch(records)?;
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_dictionary_enabled(true)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), batch.schema(), Some(props))
        .context("creating Arrow writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing Arrow writer")?;
    Ok(())
}

/// Read an artifact back into records, in file order.
pub fn read_artifact<P: AsRef<Path>>(path: P) -> Result<Vec<CanonicalRecord>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata of `{}`", path.display()))?
        .with_batch_size(8192)
        .build()?;

    let mut out = Vec::new();
    for batch in reader {
        let batch = batch.with_context(|| format!("decoding `{}`", path.display()))?;
        out.extend(batch_to_records(&batch)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{IncidentDate, IncidentType, Location};
    use chrono::NaiveDate;

    fn record(source: &str, n: u32) -> CanonicalRecord {
        CanonicalRecord::new(
            source,
            Some(IncidentDate::full(NaiveDate::from_ymd_opt(2021, 1, n).unwrap())),
            Some(IncidentType::text(format!("cause {}", n))),
            Location::default().postcode(Some(format!("LS{}", n))),
        )
    }

    #[test]
    fn accumulator_preserves_insertion_order() {
        let mut acc = RecordAccumulator::new("Wessex");
        for n in [3, 1, 2] {
            acc.add(record("Wessex", n));
        }
        let order: Vec<_> = acc
            .records()
            .iter()
            .map(|r| r.location().postcode.clone().unwrap())
            .collect();
        assert_eq!(order, vec!["LS3", "LS1", "LS2"]);
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn empty_flush_writes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = NormalizedStore::new(dir.path())?;
        let mut report = Report::new("Ofwat");

        let out = store.flush("Ofwat", &[], &mut report)?;
        assert!(out.is_none());
        assert!(!store.artifact_path("Ofwat").exists());
        assert_eq!(report.warnings(), &[Warning::EmptyFlush]);
        Ok(())
    }

    #[test]
    fn flush_then_read_back() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = NormalizedStore::new(dir.path().join("results"))?;
        let mut report = Report::new("Yorkshire Water");
        let records: Vec<_> = (1..=4).map(|n| record("Yorkshire Water", n)).collect();

        let path = store
            .flush("Yorkshire Water", &records, &mut report)?
            .expect("artifact written");
        assert!(path.ends_with("Yorkshire Water_incidents.parquet"));
        assert!(!path.with_extension("parquet.tmp").exists());
        assert_eq!(read_artifact(&path)?, records);

        // re-running replaces the artifact
        store.flush("Yorkshire Water", &records[..1], &mut report)?;
        assert_eq!(read_artifact(&path)?.len(), 1);
        assert!(report.warnings().is_empty());
        Ok(())
    }

    #[test]
    fn empty_flush_removes_previous_artifact() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = NormalizedStore::new(dir.path())?;
        let mut report = Report::new("Severn Trent");
        let path = store.artifact_path("Severn Trent");

        store.flush("Severn Trent", &[record("Severn Trent", 1)], &mut report)?;
        assert!(path.exists());

        assert!(store.flush("Severn Trent", &[], &mut report)?.is_none());
        assert!(!path.exists());
        assert!(!store.remove_artifact("Severn Trent")?);
        assert_eq!(report.warnings(), &[Warning::EmptyFlush]);
        Ok(())
    }
}
