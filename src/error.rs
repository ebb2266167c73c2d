use std::path::PathBuf;

use thiserror::Error;

/// Custom error types for ghostline
#[derive(Debug, Error)]
pub enum GhostlineError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid key binding '{0}'. Expected e.g. \"tab\", \"esc\", \"right\" or \"ctrl-y\"")]
    InvalidKeyBinding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
