//! Server-side and OAuth error types.

use thiserror::Error;

use crate::clients::response::RawResponse;

/// The server rejected a request.
///
/// Every variant except [`ApiError::RetriesExhausted`] carries the raw failed
/// response so callers can inspect status, headers and body.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller lacks permission for the entity (403 or a declared
    /// `forbidden` error type).
    #[error("forbidden: the server rejected the request with status {}", .0.status)]
    Forbidden(RawResponse),

    /// The requested entity does not exist (404 or a declared `not_found`
    /// error type).
    #[error("not found: the server rejected the request with status {}", .0.status)]
    NotFound(RawResponse),

    /// Any other non-success status.
    #[error("HTTP error {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The raw failed response.
        response: RawResponse,
    },

    /// A retryable status (502, 503, 504) persisted through every attempt
    /// allowed by the retry policy.
    #[error("exceeded maximum retry count of {attempts}, last status {status}")]
    RetriesExhausted {
        /// The status of the last attempt.
        status: u16,
        /// How many attempts were made.
        attempts: u32,
    },
}

impl ApiError {
    /// Returns the HTTP status code carried by this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Forbidden(response) | Self::NotFound(response) => response.status,
            Self::Status { status, .. } | Self::RetriesExhausted { status, .. } => *status,
        }
    }

    /// Returns the raw failed response, when one is carried.
    #[must_use]
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            Self::Forbidden(response) | Self::NotFound(response) => Some(response),
            Self::Status { response, .. } => Some(response),
            Self::RetriesExhausted { .. } => None,
        }
    }
}

/// OAuth-mode failure; carries the URL that produced it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} on url {url}")]
pub struct OAuthError {
    /// What went wrong.
    pub message: String,
    /// The URL that resulted in the error.
    pub url: String,
}

type ErrorCtor = fn(RawResponse) -> ApiError;

/// Registry mapping the server's declared `error_type` payload marker to a
/// concrete error constructor.
pub static ERROR_TYPES: &[(&str, ErrorCtor)] = &[
    ("forbidden", ApiError::Forbidden),
    ("not_found", ApiError::NotFound),
];

/// Looks up the constructor registered for a declared error type.
#[must_use]
pub fn error_for_type(error_type: &str) -> Option<ErrorCtor> {
    ERROR_TYPES
        .iter()
        .find(|(name, _)| *name == error_type)
        .map(|(_, ctor)| *ctor)
}
