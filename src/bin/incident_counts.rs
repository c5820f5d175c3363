use anyhow::{bail, Result};
use arrow::util::pretty::print_batches;
use floodnorm::aggregate::{artifacts_in, concat_artifacts, counts_batch, value_counts, write_counts_csv, CountKey};
use floodnorm::config::RunConfig;
use std::{env, path::PathBuf, process::exit};

fn parse_output(args: &[String]) -> Result<Option<PathBuf>> {
    match args {
        [] => Ok(None),
        [flag, path] if flag == "--output" || flag == "-o" => Ok(Some(PathBuf::from(path))),
        _ => bail!("unexpected arguments: {:?}", args),
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let output = match parse_output(&args[1..]) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{}\nUsage: {} [--output <CSV_FILE>]", e, args[0]);
            exit(2);
        }
    };

    let results_dir = RunConfig::from_env().results_dir;
    let paths = artifacts_in(&results_dir)?;
    if paths.is_empty() {
        eprintln!("No parquet files found in {}", results_dir.display());
        exit(1);
    }
    println!("Found {} parquet files:", paths.len());
    for p in &paths {
        println!("  - {}", p.display());
    }

    let records = concat_artifacts(&paths)?;
    let rows = value_counts(&records, &CountKey::IncidentType);

    println!("\n=== INCIDENT TYPE COUNTS ===");
    println!("Total incidents: {}", records.len());
    println!("Unique incident types: {}\n", rows.len());
    print_batches(&[counts_batch(&rows)?])?;

    if let Some(path) = output {
        write_counts_csv(&rows, &path)?;
        println!("\nResults saved to: {}", path.display());
    }
    Ok(())
}
