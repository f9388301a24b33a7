//! The FortiSOAR client facade.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use fsr_core::{
    AuthError, AuthScheme, Collection, Credential, Operation, Result, RetryAction, RetryState,
    ServerUrl,
};

use crate::api::{Alerts, ExportCache, ExportConfig, Files, SolutionPacks};
use crate::auth::Authenticator;
use crate::config::ClientConfig;
use crate::http::{ApiRequest, ApiResponse, HttpClient, ResponseBody, api_error};

/// Client for one FortiSOAR server and one credential.
///
/// Cheap to clone; clones share the session and caches.
///
/// # Example
///
/// ```no_run
/// use fsr_core::Credential;
/// use fsr_http::FortiSoar;
///
/// # async fn example() -> fsr_core::Result<()> {
/// let client = FortiSoar::new("soar.example.com", Credential::api_key("my-api-key"))?;
/// let alert = client.alerts().get("4b8d1c3e").await?;
/// println!("{}", alert["name"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct FortiSoar {
    inner: Arc<Inner>,
}

struct Inner {
    http: HttpClient,
    auth: Authenticator,
    config: ClientConfig,
    export_cache: ExportCache,
}

/// Builder for [`FortiSoar`].
#[derive(Debug)]
pub struct FortiSoarBuilder {
    server: String,
    credential: Credential,
    config: ClientConfig,
}

impl FortiSoarBuilder {
    /// Verify the server certificate (default `true`).
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.config.verify_tls = verify;
        self
    }

    /// Per-request timeout (default 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Login endpoint path (default `/auth/authenticate`).
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.login_path = path.into();
        self
    }

    /// Delay between export status checks (default 5s).
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Status checks before an export times out (default 120).
    pub fn max_export_polls(mut self, polls: u32) -> Self {
        self.config.max_export_polls = polls;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client.
    ///
    /// The credential is validated locally; no request is sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the server address is invalid or the credential
    /// fails validation.
    pub fn build(self) -> Result<FortiSoar> {
        let server = ServerUrl::new(&self.server)?;
        self.credential.validate()?;

        let http = HttpClient::new(server, &self.config)?;
        let auth = Authenticator::new(self.credential, http.clone(), &self.config.login_path);

        Ok(FortiSoar {
            inner: Arc::new(Inner {
                http,
                auth,
                config: self.config,
                export_cache: ExportCache::default(),
            }),
        })
    }
}

impl FortiSoar {
    /// Start building a client.
    pub fn builder(server: impl Into<String>, credential: impl Into<Credential>) -> FortiSoarBuilder {
        FortiSoarBuilder {
            server: server.into(),
            credential: credential.into(),
            config: ClientConfig::default(),
        }
    }

    /// Client with default settings.
    ///
    /// # Errors
    ///
    /// See [`FortiSoarBuilder::build`].
    pub fn new(server: impl Into<String>, credential: impl Into<Credential>) -> Result<Self> {
        Self::builder(server, credential).build()
    }

    /// The server this client talks to.
    pub fn server(&self) -> &ServerUrl {
        self.inner.http.server()
    }

    /// The credential scheme in use.
    pub fn scheme(&self) -> AuthScheme {
        self.inner.auth.scheme()
    }

    /// The authenticator owning this client's session.
    pub fn authenticator(&self) -> &Authenticator {
        &self.inner.auth
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub(crate) fn export_cache(&self) -> &ExportCache {
        &self.inner.export_cache
    }

    /// Log in now instead of on the first request.
    ///
    /// # Errors
    ///
    /// Any [`AuthError`] from the login exchange.
    pub async fn login(&self) -> Result<()> {
        self.inner.auth.prepare().await?;
        Ok(())
    }

    /// Check the credential against the server with `GET /api/3/people`.
    ///
    /// # Errors
    ///
    /// [`AuthError::ServerRejected`] on 401, [`Error::Api`](fsr_core::Error::Api) on other failures.
    #[instrument(skip(self), fields(server = %self.server()))]
    pub async fn verify_credentials(&self) -> Result<()> {
        self.send(ApiRequest::get("/api/3/people").query("$limit", "1"))
            .await?;
        debug!("credentials verified");
        Ok(())
    }

    /// True if [`verify_credentials`](Self::verify_credentials) succeeds.
    pub async fn is_valid(&self) -> bool {
        self.verify_credentials().await.is_ok()
    }

    /// Send an authenticated request.
    ///
    /// A 401 on a session-based credential triggers one session refresh and
    /// one retry. A second 401, or any 401 on an API key, is reported as
    /// [`AuthError::ServerRejected`].
    ///
    /// # Errors
    ///
    /// Authentication, transport and non-success status errors.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let auth = &self.inner.auth;
        let scheme = auth.scheme();

        if let Some(operation) = Operation::for_path(&ServerUrl::normalize_path(&request.path)) {
            scheme.check_supported(operation)?;
        }

        let refreshable = scheme == AuthScheme::UserPassword;
        let mut state = RetryState::default();
        let mut grant = auth.grant().await?;

        loop {
            let response = self.inner.http.execute(&request, &grant.header).await?;
            let unauthorized = response.status() == StatusCode::UNAUTHORIZED;

            match state.on_response(unauthorized, refreshable) {
                RetryAction::Deliver => return ApiResponse::read(response).await,
                RetryAction::Refresh => {
                    warn!("request unauthorized, refreshing session");
                    grant = auth.refresh_after(grant.generation).await?;
                }
                RetryAction::Reject => {
                    let body = response.bytes().await.unwrap_or_default();
                    if refreshable {
                        auth.invalidate_generation(grant.generation).await;
                    }
                    return Err(AuthError::ServerRejected {
                        scheme,
                        status: StatusCode::UNAUTHORIZED.as_u16(),
                        message: api_error(StatusCode::UNAUTHORIZED.as_u16(), &body).message,
                    }
                    .into());
                }
            }
        }
    }

    /// GET a path. Zip and octet-stream bodies come back as bytes.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<ResponseBody> {
        self.send(ApiRequest::get(path).query_pairs(query.iter().copied()))
            .await?
            .into_body()
    }

    /// GET a path and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send); also fails if the body does not decode as `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.send(ApiRequest::get(path).query_pairs(query.iter().copied()))
            .await?
            .parse()
    }

    /// POST a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.send(ApiRequest::post(path).json(body)).await?.json()
    }

    /// PUT a JSON body.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn put(&self, path: &str, body: Value) -> Result<Value> {
        self.send(ApiRequest::put(path).json(body)).await?.json()
    }

    /// DELETE a path.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    /// Run a query against `/api/query/<module>`.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn query(&self, module: &str, body: Value) -> Result<Collection> {
        let path = format!("/api/query/{}", module.trim_matches('/'));
        self.send(ApiRequest::post(path).json(body)).await?.parse()
    }

    /// Alert records.
    pub fn alerts(&self) -> Alerts<'_> {
        Alerts::new(self)
    }

    /// File uploads and attachments.
    pub fn files(&self) -> Files<'_> {
        Files::new(self)
    }

    /// Configuration export. Requires username/password authentication.
    pub fn export_config(&self) -> ExportConfig<'_> {
        ExportConfig::new(self)
    }

    /// Solution pack search and export.
    pub fn solution_packs(&self) -> SolutionPacks<'_> {
        SolutionPacks::new(self)
    }
}

impl std::fmt::Debug for FortiSoar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FortiSoar")
            .field("server", self.server())
            .field("auth", &self.inner.auth)
            .finish()
    }
}
