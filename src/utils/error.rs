//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building the symbol table
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("address ranges are not loaded; read the debug-line dump before the symbol table")]
    RangesNotLoaded,

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during trace reconstruction
///
/// Every variant aborts reconstruction; the partial graph is dropped.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("trace is empty")]
    Empty,

    #[error("malformed trace line {line}: {reason}")]
    Format { line: usize, reason: String },

    #[error("exit event on line {line} with an empty call stack")]
    Underflow { line: usize },

    #[error("line {line}: no function symbol at address {address:#x}")]
    UnknownSymbol { line: usize, address: u64 },

    #[error("failed to read trace {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TraceError {
    pub(crate) fn format(line: usize, reason: impl Into<String>) -> Self {
        Self::Format {
            line,
            reason: reason.into(),
        }
    }
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
