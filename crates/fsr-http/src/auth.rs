//! Authenticator: turns a credential into request headers and keeps the
//! login session current.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use fsr_core::{
    AuthError, AuthHeader, AuthScheme, AuthState, Credential, SessionToken, UserPassCredential,
};

use crate::http::{HttpClient, api_error, transport_error};

/// Owns one credential and the session derived from it.
///
/// API keys are stateless: [`prepare`](Self::prepare) validates the key and
/// returns its header without touching the network. Username/password
/// credentials log in once and reuse the session until it is invalidated.
///
/// At most one login exchange is in flight per authenticator. Callers that
/// arrive while a login is running wait for it and reuse its session.
pub struct Authenticator {
    credential: Credential,
    http: HttpClient,
    login_path: String,
    /// Serialises login exchanges. Holds the last issued session generation.
    login: Mutex<u64>,
    session: RwLock<Option<Session>>,
}

#[derive(Clone)]
struct Session {
    header: AuthHeader,
    generation: u64,
}

/// A header together with the session generation it was derived from.
///
/// Generation 0 means "no session" (API keys).
#[derive(Debug, Clone)]
pub(crate) struct Grant {
    pub header: AuthHeader,
    pub generation: u64,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    credentials: LoginCredentials<'a>,
}

#[derive(Serialize)]
struct LoginCredentials<'a> {
    loginid: &'a str,
    password: &'a str,
}

impl Authenticator {
    /// Create an authenticator that logs in at `login_path` on `http`'s server.
    pub fn new(credential: Credential, http: HttpClient, login_path: impl Into<String>) -> Self {
        Self {
            credential,
            http,
            login_path: login_path.into(),
            login: Mutex::new(0),
            session: RwLock::new(None),
        }
    }

    /// The credential scheme in use.
    pub fn scheme(&self) -> AuthScheme {
        self.credential.scheme()
    }

    /// Current authentication state.
    pub async fn state(&self) -> AuthState {
        match self.credential {
            Credential::ApiKey(_) => AuthState::Stateless,
            Credential::UserPassword(_) => {
                if self.session.read().await.is_some() {
                    AuthState::Authenticated
                } else if self.login.try_lock().is_err() {
                    AuthState::Authenticating
                } else {
                    AuthState::Unauthenticated
                }
            }
        }
    }

    /// Headers for the next request, logging in first if needed.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredential`] if the credential fails local validation
    /// - [`AuthError::ServerRejected`] if the login endpoint answers with a non-success status
    /// - [`AuthError::Network`] if the login exchange fails in transport
    /// - [`AuthError::MalformedResponse`] if the login response has no usable token
    #[instrument(skip(self), fields(scheme = %self.scheme()))]
    pub async fn prepare(&self) -> Result<AuthHeader, AuthError> {
        self.grant().await.map(|grant| grant.header)
    }

    /// Log in again, replacing any cached session.
    ///
    /// For API keys this only re-validates the key and returns its header.
    ///
    /// # Errors
    ///
    /// Same as [`prepare`](Self::prepare).
    #[instrument(skip(self), fields(scheme = %self.scheme()))]
    pub async fn refresh(&self) -> Result<AuthHeader, AuthError> {
        self.relogin(None).await.map(|grant| grant.header)
    }

    /// Drop the cached session. The next [`prepare`](Self::prepare) logs in again.
    ///
    /// Waits for a login in flight so its session is dropped too.
    pub async fn invalidate(&self) {
        let _login = self.login.lock().await;
        if self.session.write().await.take().is_some() {
            debug!("session invalidated");
        }
    }

    pub(crate) async fn grant(&self) -> Result<Grant, AuthError> {
        let creds = match &self.credential {
            Credential::ApiKey(key) => {
                key.validate()?;
                return Ok(Grant {
                    header: AuthHeader::api_key(key),
                    generation: 0,
                });
            }
            Credential::UserPassword(creds) => creds,
        };
        creds.validate()?;

        if let Some(grant) = self.cached().await {
            return Ok(grant);
        }

        let mut generation = self.login.lock().await;
        if let Some(grant) = self.cached().await {
            debug!("reusing session from concurrent login");
            return Ok(grant);
        }
        self.login(creds, &mut generation).await
    }

    /// Log in again unless the session has already moved past `stale`.
    pub(crate) async fn refresh_after(&self, stale: u64) -> Result<Grant, AuthError> {
        self.relogin(Some(stale)).await
    }

    /// Drop the session if it is still the one from `generation`.
    pub(crate) async fn invalidate_generation(&self, generation: u64) {
        let mut session = self.session.write().await;
        if session.as_ref().is_some_and(|s| s.generation == generation) {
            *session = None;
            debug!(generation, "session invalidated");
        }
    }

    async fn relogin(&self, stale: Option<u64>) -> Result<Grant, AuthError> {
        let creds = match &self.credential {
            Credential::ApiKey(_) => return self.grant().await,
            Credential::UserPassword(creds) => creds,
        };
        creds.validate()?;

        let mut generation = self.login.lock().await;
        if let (Some(stale), Some(current)) = (stale, self.cached().await) {
            if current.generation != stale {
                debug!("session already refreshed by another caller");
                return Ok(current);
            }
        }

        info!("refreshing session");
        self.session.write().await.take();
        self.login(creds, &mut generation).await
    }

    async fn cached(&self) -> Option<Grant> {
        self.session.read().await.as_ref().map(|s| Grant {
            header: s.header.clone(),
            generation: s.generation,
        })
    }

    /// One login round trip. Must be called with the login lock held.
    async fn login(
        &self,
        creds: &UserPassCredential,
        generation: &mut u64,
    ) -> Result<Grant, AuthError> {
        let scheme = self.scheme();
        info!(username = creds.username(), "logging in");

        let request = LoginRequest {
            credentials: LoginCredentials {
                loginid: creds.username(),
                password: creds.password(),
            },
        };

        let response = self
            .http
            .post_unauthenticated(&self.login_path, &request)
            .await
            .map_err(|source| AuthError::Network { scheme, source })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| AuthError::Network {
            scheme,
            source: transport_error(e),
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "login rejected");
            return Err(AuthError::ServerRejected {
                scheme,
                status: status.as_u16(),
                message: api_error(status.as_u16(), &body).message,
            });
        }

        let token =
            parse_token(&body).map_err(|reason| AuthError::MalformedResponse { scheme, reason })?;

        *generation += 1;
        let header = AuthHeader::bearer(&token);
        *self.session.write().await = Some(Session {
            header: header.clone(),
            generation: *generation,
        });

        info!(generation = *generation, "login succeeded");
        Ok(Grant {
            header,
            generation: *generation,
        })
    }
}

fn parse_token(body: &[u8]) -> Result<SessionToken, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("response is not JSON: {e}"))?;
    match value.get("token") {
        None => Err("missing 'token' field".to_string()),
        Some(Value::String(token)) if token.is_empty() => Err("'token' is empty".to_string()),
        Some(Value::String(token)) => Ok(SessionToken::new(token.clone())),
        Some(_) => Err("'token' is not a string".to_string()),
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("scheme", &self.scheme())
            .field("server", self.http.server())
            .field("login_path", &self.login_path)
            .field("session", &"[REDACTED]")
            .finish()
    }
}
