//! Error types for QuarryDB.

use thiserror::Error;

/// Result type alias using QuarryError.
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Errors that can occur in QuarryDB operations.
///
/// Transient negative outcomes (page not resident, duplicate key, no
/// evictable frame when callers can tolerate it) are reported through
/// `Ok(false)` / `Ok(None)` returns, not through this enum.
#[derive(Debug, Error)]
pub enum QuarryError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Buffer pool errors
    #[error("Buffer pool full, unable to allocate frame")]
    BufferPoolFull,

    #[error("Invalid frame id: {frame_id}")]
    InvalidFrame { frame_id: u32 },

    #[error("Frame {frame_id} is not evictable")]
    NotEvictable { frame_id: u32 },

    #[error("Page not found: {page_id}")]
    PageNotFound { page_id: u32 },

    // Storage errors
    #[error("Tuple not found: {0}")]
    TupleNotFound(String),

    #[error("Tuple too large: {size} bytes (max {max})")]
    TupleTooLarge { size: usize, max: usize },

    #[error("Page corrupted: {0}")]
    PageCorrupted(String),

    // B+ tree errors
    #[error("B+ tree corrupted: {0}")]
    BTreeCorrupted(String),

    #[error("Node size {size} does not fit a page (max {max})")]
    NodeSizeTooLarge { size: usize, max: usize },

    // Catalog errors
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    // Execution errors
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Execution error: {0}")]
    ExecutionError(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
