//! Error types for the Sequence Bloom Tree

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type SbtResult<T> = Result<T, SbtError>;

/// Errors that can occur while building, persisting or reloading a tree
#[derive(Debug, Error)]
pub enum SbtError {
    /// Two filters built with different construction parameters were combined
    #[error("Incompatible filters: expected {expected}, found {found}")]
    IncompatibleFilter { expected: String, found: String },

    /// Manifest or filter file is malformed or missing a required field
    #[error("Format error: {0}")]
    Format(String),

    /// A manifest or filter file could not be read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest has no root entry
    #[error("Empty tree: manifest {} has no root entry", path.display())]
    EmptyTree { path: PathBuf },

    /// Two nodes of one tree would be written to the same filter file
    #[error("Name collision: more than one node maps to filter file {file}")]
    NameCollision { file: String },

    /// Configuration or argument outside its valid range
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

impl SbtError {
    /// Wrap an I/O error together with the path it occurred on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Build an `IncompatibleFilter` error from two parameter sets
    pub fn incompatible<P: std::fmt::Debug>(expected: &P, found: &P) -> Self {
        Self::IncompatibleFilter {
            expected: format!("{expected:?}"),
            found: format!("{found:?}"),
        }
    }

    /// Map a bincode failure on `path`, keeping I/O causes distinct from bad encodings
    pub fn from_bincode(path: impl AsRef<Path>, err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(source) => Self::io(path, source),
            other => Self::Format(format!("{}: {}", path.as_ref().display(), other)),
        }
    }
}

impl From<serde_json::Error> for SbtError {
    fn from(err: serde_json::Error) -> Self {
        SbtError::Format(err.to_string())
    }
}
