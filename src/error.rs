//! Error types for the keyword gap service
//!
//! Provides unified error handling using thiserror. Only `ApiError` ever
//! reaches a client; the storage, codec and source errors are absorbed by the
//! cache and the aggregator and show up in logs or diagnostics instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

// == Storage Error ==
/// Failure reported by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The write would push the store past its byte quota
    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// Filesystem failure in a disk-backed store
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// == Codec Error ==
/// Failure while encoding or decoding a cache payload.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Compression failed: {0}")]
    Compression(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

// == Source Error ==
/// Failure fetching one source's keyword list.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Unknown source: {0}")]
    Unknown(String),

    #[error("Source I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed source payload: {0}")]
    Malformed(String),

    #[error("Source fetch timed out: {0}")]
    Timeout(String),
}

// == Parse Error ==
/// A single keyword record that failed validation.
///
/// Collected next to the records that parsed, never in place of them.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{source_id}[{index}]: {reason}")]
pub struct ParseError {
    /// Source the record came from (`subject` for the subject's own list)
    pub source_id: String,
    /// Position of the record in the source payload
    pub index: usize,
    /// Why the record was rejected
    pub reason: String,
}

// == Api Error ==
/// Errors surfaced to HTTP clients.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested cache entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
