// src/process/mod.rs
//! Cell-level normalization shared by every source: dates, coded values and
//! text cleanup.

pub mod date_parser;
pub mod legend;
pub mod utils;

pub use date_parser::{DateStandardizer, StandardizedDate};
pub use legend::{LegendTable, LEGEND_COLUMN, UNKNOWN};
