//! reqwest-backed HTTP client.

use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::{debug, instrument, trace};

use fsr_core::auth::AUTHORIZATION;
use fsr_core::{AuthHeader, Error, Result, ServerUrl, TransportError};

use super::request::{ApiRequest, Body, FilePart};
use super::transport_error;
use crate::config::ClientConfig;

/// HTTP client bound to one FortiSOAR server.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    server: ServerUrl,
}

impl HttpClient {
    /// Create a client for `server`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(server: ServerUrl, config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fsr/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(transport_error)?;

        Ok(Self { client, server })
    }

    /// Returns the server this client talks to.
    pub fn server(&self) -> &ServerUrl {
        &self.server
    }

    /// Send a request with the given authorization headers.
    ///
    /// Returns the raw response whatever its status; callers decide what a
    /// 401 means.
    #[instrument(skip(self, request, auth), fields(server = %self.server, method = %request.method, path = %request.path))]
    pub async fn execute(
        &self,
        request: &ApiRequest,
        auth: &AuthHeader,
    ) -> Result<reqwest::Response> {
        let url = self.server.endpoint_url(&request.path)?;
        debug!(%url, "sending request");
        trace!(query = ?request.query, "query parameters");

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .query(&request.query);

        for (name, value) in &request.headers {
            if !name.eq_ignore_ascii_case(AUTHORIZATION) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        for (name, value) in auth.iter() {
            builder = builder.header(name, value);
        }

        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart { files, fields } => builder.multipart(multipart_form(files, fields)?),
        };

        let response = builder.send().await.map_err(transport_error)?;
        trace!(status = %response.status(), "response received");
        Ok(response)
    }

    /// POST a JSON body without credentials. Used for the login exchange.
    #[instrument(skip(self, body), fields(server = %self.server))]
    pub async fn post_unauthenticated<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<reqwest::Response, TransportError> {
        let url = self
            .server
            .endpoint_url(path)
            .map_err(|e| TransportError::Http {
                message: e.to_string(),
            })?;
        debug!(%url, "sending unauthenticated request");

        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)
    }
}

fn multipart_form(files: &[FilePart], fields: &[(String, String)]) -> Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.clone(), value.clone());
    }
    for file in files {
        let part = Part::bytes(file.content.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| Error::from(transport_error(e)))?;
        form = form.part(file.field.clone(), part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let server = ServerUrl::new("https://soar.example.com").unwrap();
        let client = HttpClient::new(server.clone(), &ClientConfig::default()).unwrap();
        assert_eq!(client.server(), &server);
    }

    #[test]
    fn insecure_client_builds() {
        let server = ServerUrl::new("https://10.0.0.5").unwrap();
        let config = ClientConfig {
            verify_tls: false,
            ..ClientConfig::default()
        };
        assert!(HttpClient::new(server, &config).is_ok());
    }
}
