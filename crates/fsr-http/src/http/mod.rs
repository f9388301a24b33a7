//! HTTP transport for FortiSOAR requests.
//!
//! [`HttpClient`] owns the reqwest client and knows nothing about
//! credentials beyond attaching an [`AuthHeader`](fsr_core::AuthHeader).

mod client;
mod request;

pub use client::HttpClient;
pub use request::{ApiRequest, ApiResponse, Body, FilePart, ResponseBody};

use fsr_core::{ApiError, TransportError};
use serde::Deserialize;

/// Error body shape returned by FortiSOAR on non-success statuses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default, rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Build an [`ApiError`] from a status and whatever body came with it.
///
/// Non-JSON bodies are kept as the message when they are short text.
pub(crate) fn api_error(status: u16, body: &[u8]) -> ApiError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => {
            let message = parsed.message.or(parsed.error).or(parsed.detail);
            ApiError::new(status, parsed.error_type, message)
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = (!text.is_empty() && text.len() <= 512).then_some(text);
            ApiError::new(status, None, message)
        }
    }
}

/// Classify a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error) -> TransportError {
    let message = err.to_string();
    if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        if is_tls_failure(&err) {
            TransportError::Tls { message }
        } else {
            TransportError::Connection { message }
        }
    } else if err.is_decode() || err.is_body() {
        TransportError::Decode { message }
    } else {
        TransportError::Http { message }
    }
}

fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        let text = inner.to_string().to_ascii_lowercase();
        if text.contains("certificate") || text.contains("tls") {
            return true;
        }
        source = inner.source();
    }
    false
}
