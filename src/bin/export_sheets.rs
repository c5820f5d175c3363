use anyhow::{Context, Result};
use floodnorm::pipeline::discover_files;
use floodnorm::sheet::{export_csv, Workbook};
use std::{env, fs, path::Path, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Dump every sheet of every workbook under a directory to CSV, for eyeballing
/// a new release before writing its shape.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <INPUT_DIR> <OUTPUT_DIR>", args[0]);
        exit(1);
    }
    let (input, output) = (Path::new(&args[1]), Path::new(&args[2]));
    fs::create_dir_all(output).with_context(|| format!("creating {}", output.display()))?;

    let mut written = 0usize;
    for path in discover_files(input)? {
        let book = match Workbook::open(&path) {
            Ok(b) => b,
            Err(e) => {
                error!(file = %path.display(), "skipping: {:#}", e);
                continue;
            }
        };
        let files = export_csv(&book, output)?;
        info!(file = %path.display(), sheets = files.len(), "exported");
        written += files.len();
    }
    info!("wrote {} CSV files to {}", written, output.display());
    Ok(())
}
