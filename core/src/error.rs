//! Error types for the users API client.
//!
//! # Design
//! Every non-success status, whether reported by the transport or
//! synthesized by the client for an empty search, lands in `Http` carrying
//! the service's status, error code and message unchanged. The remaining
//! variants cover failures that never reached the service or whose payload
//! could not be understood.

use thiserror::Error;

/// Error code the service uses for missing resources.
pub const NOT_FOUND_CODE: &str = "not_found";

/// A non-2xx response from the service, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("HTTP {status} ({code}): {message}")]
pub struct HttpError {
    pub status: u16,
    pub code: String,
    pub message: String,
}

impl HttpError {
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// The error returned when a search by `user_id` or email matches nobody.
    pub fn user_not_found() -> Self {
        Self::new(404, NOT_FOUND_CODE, "User Not Found")
    }
}

/// Errors returned by user operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// None of `id`, `user_id` or `email` was supplied to a lookup.
    #[error("missing user identifier")]
    MissingIdentifier,

    /// The service answered with a non-success status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The request never produced a response (DNS, connect, TLS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Http(err) if err.status == 404)
    }

    /// Status code of the underlying HTTP error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http(err) => Some(err.status),
            _ => None,
        }
    }
}
