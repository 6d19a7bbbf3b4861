use thiserror::Error;

use crate::parser::ParseError;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AsmError>;

/// Top-level error for graph construction and the tools built on it.
///
/// Parse and IO failures abort the whole invocation; no partial output is
/// produced. A [`LookupError`] means the id/index bijection was violated,
/// which is an internal inconsistency and always fatal.
#[derive(Error, Debug)]
pub enum AsmError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid walk: {0}")]
    Walk(String),
}

/// A segment id or node index was absent from the graph lookups.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    #[error("segment ID {0} is not present in the graph lookups")]
    SegmentId(usize),

    #[error("node index {0} is not present in the graph lookups")]
    NodeIndex(usize),
}
