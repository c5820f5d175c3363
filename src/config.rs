use std::env;
use std::path::PathBuf;

pub const SOURCE_DIR_VAR: &str = "FLOOD_SOURCE_DIR";
pub const RESULTS_DIR_VAR: &str = "FLOOD_RESULTS_DIR";
pub const SOURCES_VAR: &str = "FLOOD_SOURCES";

/// Where a run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Root holding one directory per source.
    pub source_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Restrict the run to these source names; `None` runs every source.
    pub only: Option<Vec<String>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("source"),
            results_dir: PathBuf::from("results"),
            only: None,
        }
    }
}

impl RunConfig {
    pub fn new(source_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            results_dir: results_dir.into(),
            only: None,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Self {
        let defaults = Self::default();
        let only = get(SOURCES_VAR)
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|names| !names.is_empty());
        Self {
            source_dir: get(SOURCE_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),
            results_dir: get(RESULTS_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.results_dir),
            only,
        }
    }

    pub fn wants(&self, source: &str) -> bool {
        self.only
            .as_ref()
            .map_or(true, |names| names.iter().any(|n| n == source))
    }
}
