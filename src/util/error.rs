//! Error types for the VIM reader and exporter.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for VIM operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid command-line or API arguments
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Input file does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// A required named buffer is absent from its container
    #[error("Buffer not found: {0}")]
    NotFound(String),

    /// Invalid magic number at the start of a container
    #[error("Invalid BFast container: bad magic 0x{0:x}")]
    InvalidMagic(u64),

    /// Container or buffer is truncated
    #[error("Unexpected end of data at position {0}")]
    UnexpectedEof(u64),

    /// Malformed bytes
    #[error("Invalid format: {0}")]
    Format(String),

    /// Text segment that is not valid UTF-8
    #[error("Invalid UTF-8 at byte offset {offset}: {source}")]
    Utf8 {
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    /// Columns of one entity table disagree on row count
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// Entity table buffer with a name matching no known column kind
    #[error("'{0}' is not a recognized entity table buffer")]
    UnrecognizedBuffer(String),

    /// Error raised while processing one export section
    #[error("{section}: {source}")]
    Section {
        section: String,
        #[source]
        source: Box<Error>,
    },

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a format error from a string.
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    /// Wrap an error with the name of the section it came from.
    pub fn in_section(section: impl Into<String>, source: Error) -> Self {
        Self::Section {
            section: section.into(),
            source: Box::new(source),
        }
    }

    /// True for malformed-bytes errors (the recoverable kind for entity tables).
    pub fn is_format(&self) -> bool {
        match self {
            Self::InvalidMagic(_)
            | Self::UnexpectedEof(_)
            | Self::Format(_)
            | Self::Utf8 { .. }
            | Self::RowCountMismatch { .. }
            | Self::UnrecognizedBuffer(_) => true,
            Self::Section { source, .. } => source.is_format(),
            _ => false,
        }
    }

    /// True when a named buffer was missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Section { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// Result type alias for VIM operations.
pub type Result<T> = std::result::Result<T, Error>;
