// src/pipeline.rs
//! Drives each source from raw files to its artifact.

use crate::adapter::{SourceAdapter, SourceRegistry};
use crate::config::RunConfig;
use crate::report::{Report, Warning};
use crate::sheet::read::is_workbook;
use crate::store::NormalizedStore;
use anyhow::{Context, Result};
use glob::{glob, Pattern};
use rayon::prelude::*;
use serde::Serialize;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

pub const SUMMARY_FILE: &str = "run_summary.json";

/// What happened to one source during a run.
#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub source: String,
    pub records: usize,
    pub artifact: Option<PathBuf>,
    pub warnings: Vec<Warning>,
    /// Set when the source failed; it then has no artifact.
    pub error: Option<String>,
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Every spreadsheet under `dir`, recursively, in sorted path order.
/// A missing directory yields an empty list.
pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let pattern = format!("{}/**/*", Pattern::escape(&dir.to_string_lossy()));
    let mut files = Vec::new();
    for entry in glob(&pattern).with_context(|| format!("bad glob pattern {}", pattern))? {
        let path = entry.with_context(|| format!("listing {}", dir.display()))?;
        if path.is_file() && is_workbook(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn extract_and_flush(
    adapter: &dyn SourceAdapter,
    config: &RunConfig,
    report: &mut Report,
) -> Result<(usize, Option<PathBuf>)> {
    let dir = config.source_dir.join(adapter.dir_name());
    let files = discover_files(&dir)?;
    let acc = adapter.process(&dir, &files, report)?;
    let store = NormalizedStore::new(&config.results_dir)?;
    let artifact = store.flush(adapter.name(), acc.records(), report)?;
    Ok((acc.len(), artifact))
}

/// Discover, extract and persist one source. Failures are captured in the
/// outcome rather than returned, so one broken source never stops a run.
/// A failed source also loses its artifact from any previous run.
#[tracing::instrument(level = "info", skip_all, fields(source = adapter.name()))]
pub fn run_source(adapter: &dyn SourceAdapter, config: &RunConfig) -> SourceOutcome {
    let mut report = Report::new(adapter.name());
    let (records, artifact, error) = match extract_and_flush(adapter, config, &mut report) {
        Ok((n, artifact)) => (n, artifact, None),
        Err(e) => {
            error!(source = adapter.name(), "source failed: {:#}", e);
            let cleared = NormalizedStore::new(&config.results_dir)
                .and_then(|store| store.remove_artifact(adapter.name()));
            if let Err(ce) = cleared {
                warn!(source = adapter.name(), "could not clear previous artifact: {:#}", ce);
            }
            (0, None, Some(format!("{:#}", e)))
        }
    };
    SourceOutcome {
        source: adapter.name().to_string(),
        records,
        artifact,
        warnings: report.warnings().to_vec(),
        error,
    }
}

/// Run every selected source in parallel and write the run summary.
pub fn run_all(registry: &SourceRegistry, config: &RunConfig) -> Result<Vec<SourceOutcome>> {
    if let Some(names) = &config.only {
        for name in names {
            if registry.get(name).is_none() {
                warn!(source = %name, "requested source is not registered");
            }
        }
    }

    let adapters: Vec<&dyn SourceAdapter> =
        registry.iter().filter(|a| config.wants(a.name())).collect();
    info!(sources = adapters.len(), "starting run");

    let outcomes: Vec<SourceOutcome> = adapters
        .par_iter()
        .map(|adapter| run_source(*adapter, config))
        .collect();

    let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
    let total: usize = outcomes.iter().map(|o| o.records).sum();
    info!(total_records = total, failed, "run finished");

    write_summary(&config.results_dir, &outcomes)?;
    Ok(outcomes)
}

fn write_summary(results_dir: &Path, outcomes: &[SourceOutcome]) -> Result<PathBuf> {
    fs::create_dir_all(results_dir)
        .with_context(|| format!("creating results directory {:?}", results_dir))?;
    let path = results_dir.join(SUMMARY_FILE);
    let tmp = path.with_extension("json.tmp");
    {
        let file = File::create(&tmp).with_context(|| format!("creating {:?}", tmp))?;
        serde_json::to_writer_pretty(BufWriter::new(file), outcomes)
            .context("serializing run summary")?;
    }
    fs::rename(&tmp, &path).with_context(|| format!("renaming {:?} -> {:?}", tmp, path))?;
    Ok(path)
}
