//! Error types for the ANIM codec.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ANIM operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Unrecognized tangent type keyword
    #[error("Unknown tangent type: {0}")]
    UnknownTangentType(String),

    /// Unrecognized pre/post infinity keyword
    #[error("Unknown infinity type: {0}")]
    UnknownInfinityType(String),

    /// Unrecognized unit name (time, linear, angular or output domain)
    #[error("Unknown {kind} unit: {name}")]
    UnknownUnit { kind: &'static str, name: String },

    /// Header fields are inconsistent (e.g. startTime > endTime)
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Statement or block at an unexpected position
    #[error("Invalid file structure at line {line}: {message}")]
    InvalidStructure { line: usize, message: String },

    /// A `{` block ran past the end of the document
    #[error("Unterminated {block} block starting at line {line}")]
    UnterminatedBlock { block: &'static str, line: usize },

    /// Node list and node-space list passed to encode differ in length
    #[error("Node space count {spaces} does not match node count {nodes}")]
    NodeSpaceMismatch { nodes: usize, spaces: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a structural error at a given line.
    pub fn structural(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidStructure { line, message: message.into() }
    }

    /// True when the error invalidates the whole document rather than
    /// just the current parsing position. Structural errors allow a
    /// best-effort partial decode; these do not.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownTangentType(_)
                | Self::UnknownInfinityType(_)
                | Self::UnknownUnit { .. }
                | Self::Io(_)
                | Self::FileNotFound(_)
        )
    }
}

/// Result type alias for ANIM operations.
pub type Result<T> = std::result::Result<T, Error>;
