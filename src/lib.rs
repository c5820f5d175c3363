//! Normalizes flooding-incident spreadsheets from many water companies into
//! one canonical record shape, persisted as one Parquet artifact per source.

pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod record;
pub mod report;
pub mod sheet;
pub mod store;
