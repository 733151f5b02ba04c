//! Error types for the Toptranslation API client.
//!
//! The taxonomy follows three distinguishable categories:
//!
//! - [`ClientError`]: local configuration or programmer errors that are never
//!   retried (bad user agent, unknown endpoint name, missing profile).
//! - [`ApiError`](crate::clients::ApiError): the server rejected the request;
//!   carries the raw failed response.
//! - [`OAuthError`](crate::clients::OAuthError): OAuth-mode failure; carries
//!   the offending URL.
//!
//! [`Error`] is the umbrella type returned by the public client methods, so a
//! caller can match once and still get at the specific category.

use std::path::PathBuf;

use thiserror::Error;

use crate::clients::{ApiError, OAuthError};

/// Errors caused on the client side, before any request leaves the process.
///
/// These fail fast and are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The caller-supplied application identifier is empty.
    #[error("user agent must be a non-empty string identifying your application")]
    InvalidUserAgent,

    /// A logical endpoint name did not match any entry in the endpoint table.
    #[error("unknown endpoint name '{name}'")]
    UnknownEndpoint {
        /// The name that failed to resolve.
        name: String,
    },

    /// No configuration file was found in any of the searched locations.
    #[error("could not find a configuration file in any of: {searched:?}")]
    ConfigFileNotFound {
        /// The paths that were searched, in order.
        searched: Vec<PathBuf>,
    },

    /// The configuration file exists but has no section for the site name.
    #[error("configuration has no profile named '{site}'")]
    MissingProfile {
        /// The requested profile/site name.
        site: String,
    },

    /// A required setting is absent after merging all configuration sources.
    #[error("missing required setting '{key}'")]
    MissingSetting {
        /// The setting key that was not resolved.
        key: &'static str,
    },

    /// A setting was present but could not be parsed into its expected type.
    #[error("invalid value for setting '{key}': {reason}")]
    InvalidSetting {
        /// The offending setting key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The operation exists in the endpoint table but has no implementation.
    #[error("'{operation}' is not implemented")]
    NotImplemented {
        /// The logical operation name.
        operation: &'static str,
    },

    /// The response parsed as JSON but lacked an expected field.
    #[error("response payload is missing expected field '{field}'")]
    UnexpectedPayload {
        /// The field that was expected.
        field: &'static str,
    },
}

/// Umbrella error type for all client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local configuration or programmer error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The server rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// OAuth-mode failure.
    #[error(transparent)]
    OAuth(#[from] OAuthError),

    /// The response body was not valid JSON.
    #[error("failed to parse response body as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Network or transport-level error, propagated uninterpreted.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A document slated for upload could not be read from disk.
    #[error("could not read document '{}': {source}", path.display())]
    DocumentUnreadable {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
