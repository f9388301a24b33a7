//! fsr-core - Core FortiSOAR client types.
//!
//! Credentials and their local validation, the authentication state and
//! header types, the 401 refresh-and-retry state machine, and the error
//! taxonomy shared by the HTTP client and the CLI. Nothing here touches the
//! network.

pub mod auth;
pub mod credentials;
pub mod error;
pub mod models;
pub mod tokens;
pub mod types;

pub use auth::{AuthHeader, AuthScheme, AuthState, Operation, RetryAction, RetryState};
pub use credentials::{ApiKeyCredential, ApiKeyFormat, Credential, UserPassCredential};
pub use error::{
    ApiError, ApiErrorKind, AuthError, Error, InvalidInputError, TransportError, ValidationError,
};
pub use models::{Collection, ListParams, SimplifiedTemplate};
pub use tokens::SessionToken;
pub use types::{Iri, ServerUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
