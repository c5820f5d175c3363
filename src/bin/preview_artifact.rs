use arrow::util::pretty::print_batches;
use floodnorm::aggregate::preview;
use std::{env, path::Path, process::exit};

const PREVIEW_ROWS: usize = 10;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <PARQUET_FILE>", args[0]);
        exit(1);
    }
    let path = Path::new(&args[1]);
    println!("\nFirst {} rows of {}:", PREVIEW_ROWS, path.display());
    let shown = preview(path, PREVIEW_ROWS).and_then(|batches| Ok(print_batches(&batches)?));
    if let Err(e) = shown {
        eprintln!("Error reading {}: {:#}", path.display(), e);
        exit(1);
    }
}
