//! Request and response values.

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;

use fsr_core::{Error, Result, TransportError};

use super::{api_error, transport_error};

/// A file carried in a multipart request.
///
/// The content is held in memory so the request can be sent again after a
/// session refresh.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub content: Bytes,
}

impl FilePart {
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            content: content.into(),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart {
        files: Vec<FilePart>,
        fields: Vec<(String, String)>,
    },
}

/// A single API call, independent of credentials.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append several query parameters.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add a request header. Authorization headers are always overridden.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Send a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    /// Send a multipart body.
    pub fn multipart(mut self, files: Vec<FilePart>, fields: Vec<(String, String)>) -> Self {
        self.body = Body::Multipart { files, fields };
        self
    }
}

/// Decoded success body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    /// Zip archives and octet streams.
    Bytes(Bytes),
}

impl ResponseBody {
    /// The JSON value, if this is a JSON body.
    pub fn into_json(self) -> Option<Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Bytes(_) => None,
        }
    }
}

/// A fully read success response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl ApiResponse {
    /// Read a response, turning non-success statuses into [`Error::Api`].
    pub(crate) async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(Error::Api(api_error(status.as_u16(), &body)));
        }

        Ok(Self {
            status: status.as_u16(),
            content_type,
            body,
        })
    }

    /// Returns true for zip archives and octet streams.
    pub fn is_binary(&self) -> bool {
        self.content_type.as_deref().is_some_and(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.contains("application/zip") || ct.contains("application/octet-stream")
        })
    }

    /// Decode the body as JSON. An empty body decodes to `null`.
    pub fn json(&self) -> Result<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body).map_err(|e| {
            TransportError::Decode {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Decode the body into a typed value.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::UnexpectedResponse(format!("HTTP {}: {e}", self.status)))
    }

    /// JSON or raw bytes depending on the content type.
    pub fn into_body(self) -> Result<ResponseBody> {
        if self.is_binary() {
            Ok(ResponseBody::Bytes(self.body))
        } else {
            self.json().map(ResponseBody::Json)
        }
    }
}
