//! Custom error types for the pmss-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// Every variant is terminal for the stream that raised it: once a read
/// fails, the file position can no longer be trusted, because the format
/// has no resynchronization point other than the start of the file.
#[derive(Debug, Error)]
pub enum PmssError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// A Fortran record marker does not match the byte length of the
    /// payload it encloses, indicating corruption or a wrong byte-swap flag.
    #[error("record marker mismatch in {context}: expected {expected} bytes, found {found}")]
    MarkerMismatch {
        context: &'static str,
        expected: i64,
        found: i64,
    },

    /// A data block declared a zero or negative row count.
    #[error("invalid row count declared by data block: {0}")]
    InvalidRowCount(i32),

    /// The file ended in the middle of a record. A well-formed file may
    /// only end at a block boundary, so this is corruption, not a clean end.
    #[error("file truncated while reading {context}")]
    Truncated { context: &'static str },

    /// A schema asked for a column name the reader does not export. This is
    /// a programming error in the binding layer, not a data error.
    #[error("unknown column name: {0:?}")]
    UnknownColumn(String),
}

impl PmssError {
    /// Classify a failed read inside a record: EOF is truncation (the format
    /// only permits a clean end at a block boundary), anything else is I/O.
    pub(crate) fn from_read(e: std::io::Error, context: &'static str) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            PmssError::Truncated { context }
        } else {
            PmssError::Io(e)
        }
    }
}

/// A convenient Result type alias for this crate.
pub type Result<T> = std::result::Result<T, PmssError>;
