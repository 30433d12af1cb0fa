//! Typed failures for every catalog operation.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A required field was missing or empty.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced god or song does not exist in the document.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The configured document path (or its parent directory) does not exist.
    #[error("Catalog document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// The document is not valid JSON or does not have the catalog shape.
    #[error("Malformed catalog document: {0}")]
    MalformedDocument(String),

    /// An asset source file was missing at copy time.
    #[error("Asset source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Configuration values point at something unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        CatalogError::Validation(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        CatalogError::NotFound(msg.into())
    }
}
