use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::catalog_error::CatalogError;

/// Envelope returned across the C ABI and printed by the CLI.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum AppResponse {
    StorageError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl From<CatalogError> for AppResponse {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(msg) => AppResponse::ValidationError(msg),
            CatalogError::NotFound(msg) => AppResponse::NotFound(msg),
            CatalogError::DocumentNotFound(path) => {
                AppResponse::NotFound(format!("Catalog document not found: {}", path.display()))
            }
            CatalogError::SourceNotFound(path) => {
                AppResponse::BadRequest(format!("Asset source not found: {}", path.display()))
            }
            CatalogError::MalformedDocument(msg) => {
                AppResponse::SerializationError(format!("Malformed catalog document: {}", msg))
            }
            CatalogError::Config(msg) => AppResponse::BadRequest(msg),
            CatalogError::Io(io_err) => AppResponse::StorageError(format!("IO error: {}", io_err)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// Serializes `value` into an `Ok` response.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => AppResponse::Ok(json),
            Err(e) => AppResponse::from(e),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AppResponse::Ok(_))
    }
}

/// Maps an operation result straight onto a response.
impl<T: Serialize> From<Result<T, CatalogError>> for AppResponse {
    fn from(result: Result<T, CatalogError>) -> Self {
        match result {
            Ok(value) => AppResponse::json(&value),
            Err(e) => AppResponse::from(e),
        }
    }
}
