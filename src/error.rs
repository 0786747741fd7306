use std::path::PathBuf;

use thiserror::Error;

/// Problems found while turning level text into a grid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level plan is empty")]
    Empty,
    #[error("row {row} has {actual} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[error("unknown character {ch:?} at row {row}, column {column}")]
    UnknownChar { ch: char, row: usize, column: usize },
    #[error("level has no player spawn")]
    MissingPlayer,
    #[error("second player spawn at row {row}, column {column}")]
    DuplicatePlayer { row: usize, column: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
