//! Error types for todo input validation and the API client.
//!
//! # Design
//! A missing record is not an error inside the store: lookups return
//! `Option` and deletes return `bool`. `NotFound` only exists here, on the
//! client side, where a 404 response has to be surfaced to the caller.

use thiserror::Error;

/// Rejected todo input. Checked by the HTTP layer before the store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
}

/// Rejected user registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("username `{0}` is already taken")]
    UsernameTaken(String),
}

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the request (malformed id or body).
    #[error("bad request: {message}")]
    BadRequest { message: String, errors: Vec<String> },

    /// Any other unexpected status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
