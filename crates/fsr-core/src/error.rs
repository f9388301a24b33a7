//! Error types for the fsr libraries.
//!
//! Validation failures are local and happen before any request is built.
//! Authentication failures carry the [`AuthScheme`] that failed so the
//! message tells the user which credential was at fault. Everything the
//! server answers with a non-success status becomes an [`ApiError`].

use std::fmt;
use thiserror::Error;

use crate::auth::{AuthScheme, Operation};

/// The unified error type for fsr operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication errors (bad credential, login rejected, session lost).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The server answered a resource request with a non-success status.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Input validation errors (server URL, IRIs, file names).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// A named object (picklist, connector, template, pack) does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// The server returned a success status with a body we cannot use.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A configuration export job failed or did not finish in time.
    #[error("export failed: {0}")]
    Export(String),

    /// Local file system errors (uploads, downloads).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Auth(AuthError::InvalidCredential(err))
    }
}

/// Local credential validation failures. No request is ever sent after one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The API key is blank.
    #[error("API key is empty")]
    Empty,

    /// The API key does not match the expected key format.
    #[error("API key does not match the expected format")]
    InvalidFormat,

    /// A username/password field is blank.
    #[error("{0} must not be empty")]
    MissingField(&'static str),
}

/// Authentication failures, tagged with the credential scheme in use.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential failed local validation.
    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] ValidationError),

    /// The server refused the credential or session.
    #[error("{scheme} rejected by server (HTTP {status}){}", fmt_detail(.message))]
    ServerRejected {
        scheme: AuthScheme,
        status: u16,
        message: Option<String>,
    },

    /// The login exchange failed at the transport layer.
    #[error("{scheme} login failed: {source}")]
    Network {
        scheme: AuthScheme,
        #[source]
        source: TransportError,
    },

    /// The login response did not contain usable session material.
    #[error("{scheme} login returned a malformed response: {reason}")]
    MalformedResponse { scheme: AuthScheme, reason: String },

    /// The operation is not available with this credential scheme.
    #[error("operation '{operation}' is not supported with {scheme}")]
    UnsupportedOperation {
        operation: Operation,
        scheme: AuthScheme,
    },
}

impl AuthError {
    /// Returns true when the server itself refused the credential.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AuthError::ServerRejected { .. })
    }
}

fn fmt_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {m}"))
        .unwrap_or_default()
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// TLS/SSL error.
    #[error("TLS error: {message}")]
    Tls { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The response body could not be read or decoded.
    #[error("failed to decode response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Classification of a non-success API status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 400: the server rejected the request payload.
    BadRequest,
    /// 401: authentication required or failed.
    Unauthorized,
    /// 403: authenticated but not permitted.
    Forbidden,
    /// 404: the resource does not exist.
    NotFound,
    /// Any other non-success status.
    Other,
}

/// A non-success response from a resource endpoint.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Error type reported by the server (if present).
    pub error_type: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error_type) = self.error_type {
            write!(f, " [{error_type}]")?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, error_type: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error_type,
            message,
        }
    }

    /// Classify the status code.
    pub fn kind(&self) -> ApiErrorKind {
        match self.status {
            400 => ApiErrorKind::BadRequest,
            401 => ApiErrorKind::Unauthorized,
            403 => ApiErrorKind::Forbidden,
            404 => ApiErrorKind::NotFound,
            _ => ApiErrorKind::Other,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.kind() == ApiErrorKind::Unauthorized
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid server base address.
    #[error("invalid server URL '{value}': {reason}")]
    ServerUrl { value: String, reason: String },

    /// Invalid resource IRI.
    #[error("invalid IRI '{value}': {reason}")]
    Iri { value: String, reason: String },

    /// Invalid API key pattern.
    #[error("invalid API key pattern '{value}': {reason}")]
    KeyPattern { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
