//! Authentication primitives shared by every transport.
//!
//! This module holds the scheme-independent pieces: which scheme is in use,
//! which operations it may perform, the header set it produces and the
//! observable state of a session-based login.

mod header;
mod retry;

pub use header::{AUTHORIZATION, AuthHeader};
pub use retry::{RetryAction, RetryState};

use std::fmt;

use crate::error::AuthError;

/// Credential scheme in use by an authenticator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    /// Stateless `Authorization: API-KEY <key>` header.
    ApiKey,
    /// Login exchange yielding a bearer session token.
    UserPassword,
}

impl AuthScheme {
    /// Operations this scheme cannot perform.
    pub fn unsupported_operations(self) -> &'static [Operation] {
        match self {
            AuthScheme::ApiKey => &[Operation::Auth, Operation::ConfigExport],
            AuthScheme::UserPassword => &[],
        }
    }

    /// Returns true if the operation is available with this scheme.
    pub fn supports(self, operation: Operation) -> bool {
        !self.unsupported_operations().contains(&operation)
    }

    /// Fail with [`AuthError::UnsupportedOperation`] if the operation is unavailable.
    ///
    /// # Errors
    ///
    /// Returns an error if this scheme cannot perform `operation`.
    pub fn check_supported(self, operation: Operation) -> Result<(), AuthError> {
        if self.supports(operation) {
            Ok(())
        } else {
            Err(AuthError::UnsupportedOperation {
                operation,
                scheme: self,
            })
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthScheme::ApiKey => f.write_str("API key authentication"),
            AuthScheme::UserPassword => f.write_str("username/password authentication"),
        }
    }
}

/// Server operations that some credential schemes may not perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Anything under `/api/auth/`.
    Auth,
    /// Configuration export (templates, jobs, downloads).
    ConfigExport,
    /// Playbook operations.
    Playbook,
    /// Solution pack operations.
    SolutionPack,
}

impl Operation {
    /// Returns the wire name of the operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Auth => "auth",
            Operation::ConfigExport => "config_export",
            Operation::Playbook => "playbook",
            Operation::SolutionPack => "solution_pack",
        }
    }

    /// The operation implied by a request path, if it is restricted.
    pub fn for_path(path: &str) -> Option<Self> {
        path.starts_with("/api/auth/").then_some(Operation::Auth)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable authentication state of an authenticator.
///
/// Session-based credentials move through
/// `Unauthenticated -> Authenticating -> Authenticated` and fall back to
/// `Unauthenticated` when the server rejects the session. API keys have no
/// session and always report [`AuthState::Stateless`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No session is cached.
    Unauthenticated,
    /// A login exchange is in flight.
    Authenticating,
    /// A session is cached and will be reused.
    Authenticated,
    /// API key: nothing to cache.
    Stateless,
}
