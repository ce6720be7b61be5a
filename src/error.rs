use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why an edit to the line buffer was refused. The buffer is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    #[error("line buffer is full (capacity {capacity})")]
    BufferFull { capacity: usize },

    #[error("line buffer has no usable capacity")]
    NoCapacity,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Line capacity {0} is too small, need at least 2")]
    CapacityTooSmall(usize),
}
