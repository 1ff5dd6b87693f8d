//! Error types for schema generation and sketch file I/O

use thiserror::Error;

/// Result type for sketch-document operations
pub type Result<T> = std::result::Result<T, SketchError>;

/// Errors surfaced by the generator pipeline and the file reader/writer.
///
/// There is no recovery path: every variant aborts the run. The CLI maps
/// any of these to a nonzero exit code without writing partial output.
#[derive(Error, Debug)]
pub enum SketchError {
    #[error("unsupported schema: {0}")]
    UnsupportedSchema(String),

    #[error("duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    #[error("registry fetch failed: {0}")]
    Fetch(String),

    #[error("invalid package archive: {0}")]
    InvalidArchive(String),

    #[error("invalid sketch file: {0}")]
    InvalidSketchFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
