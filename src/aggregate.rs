// src/aggregate.rs
//! Cross-source reads over the artifact directory.

use crate::record::CanonicalRecord;
use crate::store::read_artifact;
use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray, UInt64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use glob::{glob, Pattern};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Serialize;
use std::{
    collections::HashMap,
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;

/// Every `*.parquet` artifact directly inside `dir`, sorted by path.
pub fn artifacts_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = format!("{}/*.parquet", Pattern::escape(&dir.to_string_lossy()));
    let mut paths = glob(&pattern)
        .with_context(|| format!("bad glob pattern {}", pattern))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("listing {}", dir.display()))?;
    paths.sort();
    Ok(paths)
}

/// All records of the given artifacts, in path order then file order.
pub fn concat_artifacts(paths: &[PathBuf]) -> Result<Vec<CanonicalRecord>> {
    let mut out = Vec::new();
    for path in paths {
        let records = read_artifact(path)?;
        info!(path = %path.display(), rows = records.len(), "loaded artifact");
        out.extend(records);
    }
    Ok(out)
}

/// What to group records by in [`value_counts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountKey {
    /// The flat `incident_type` label.
    IncidentType,
    /// One named sub-field of structured incident types.
    Field(String),
    Source,
    Precision,
}

impl CountKey {
    fn value_of(&self, r: &CanonicalRecord) -> Option<String> {
        match self {
            CountKey::IncidentType => r.incident_type().map(|t| t.label()),
            CountKey::Field(name) => r
                .incident_type()
                .and_then(|t| t.field(name))
                .map(str::to_string),
            CountKey::Source => Some(r.source_name().to_string()),
            CountKey::Precision => r.date_precision().map(|p| p.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow {
    #[serde(rename = "Incident Type")]
    pub value: String,
    #[serde(rename = "Count")]
    pub count: usize,
    #[serde(rename = "Percentage")]
    pub percentage: f64,
}

/// Frequency of each distinct key value, most frequent first, ties by value.
///
/// Percentages are of all records, rounded to two decimals, so records
/// without a value lower every share without appearing as a row.
pub fn value_counts(records: &[CanonicalRecord], key: &CountKey) -> Vec<CountRow> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for r in records {
        if let Some(v) = key.value_of(r) {
            *counts.entry(v).or_default() += 1;
        }
    }

    let total = records.len() as f64;
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(value, count)| CountRow {
            value,
            count,
            percentage: (count as f64 / total * 100.0 * 100.0).round() / 100.0,
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    rows
}

pub fn write_counts_csv(rows: &[CountRow], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// The counts as a batch, for the arrow pretty printer.
pub fn counts_batch(rows: &[CountRow]) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("Incident Type", DataType::Utf8, false),
        Field::new("Count", DataType::UInt64, false),
        Field::new("Percentage", DataType::Float64, false),
    ]);
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.value.as_str()))),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.count as u64))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.percentage))),
    ];
    RecordBatch::try_new(Arc::new(schema), columns).context("building counts batch")
}

/// The first `limit` rows of an artifact, as stored.
pub fn preview(path: &Path, limit: usize) -> Result<Vec<RecordBatch>> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("reading parquet metadata of `{}`", path.display()))?
        .with_limit(limit)
        .build()?;
    reader
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("decoding `{}`", path.display()))
}
