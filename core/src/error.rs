//! Error types for the item client and shell.
//!
//! # Design
//! `NotFound` and `BadRequest` get dedicated variants because they are the
//! two client errors the service signals on purpose; both carry the
//! envelope's message. Any other non-success status lands in `HttpError`
//! with the raw body. Connectivity failures never reach `ApiError`: they are
//! a `TransportError`, detected only on this side of the wire.

use thiserror::Error;

/// Errors returned by `ItemClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The server returned 400.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// The request never produced an HTTP response.
#[derive(Debug, Error)]
#[error("transport failed: {0}")]
pub struct TransportError(pub String);

/// Anything a shell action can fail with.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ShellError {
    /// True when the service could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ShellError::Transport(_))
    }
}
