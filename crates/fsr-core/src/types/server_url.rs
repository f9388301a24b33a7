//! Server base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Path prefixes that are already routed and must not get `/api/3` prepended.
const ROUTED_PREFIXES: &[&str] = &["/api/3/", "/auth/", "/api/public/", "/api/"];

/// Default API version prefix for bare module paths.
const API_PREFIX: &str = "/api/3";

/// A validated FortiSOAR server base URL.
///
/// A bare host gets `https://` prepended and a trailing slash is removed.
/// Only HTTPS is accepted, except plain HTTP for localhost.
///
/// # Example
///
/// ```
/// use fsr_core::ServerUrl;
///
/// let server = ServerUrl::new("soar.example.com/").unwrap();
/// assert_eq!(server.as_str(), "https://soar.example.com");
/// assert_eq!(server.endpoint_url("alerts").unwrap(),
///            "https://soar.example.com/api/3/alerts");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServerUrl(Url);

impl ServerUrl {
    /// Create a new server URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let original = s.as_ref().trim();
        let with_scheme = if original.contains("://") {
            original.to_string()
        } else {
            format!("https://{original}")
        };

        let mut url = Url::parse(&with_scheme).map_err(|e| InvalidInputError::ServerUrl {
            value: original.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, original)?;

        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&trimmed);
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self(url))
    }

    /// Normalise an API path: leading slash, and `/api/3` for bare module paths.
    pub fn normalize_path(path: &str) -> String {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        if ROUTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
            path
        } else {
            format!("{API_PREFIX}{path}")
        }
    }

    /// Returns the full URL for an API path or IRI.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is an absolute URL; requests never leave
    /// the configured server.
    pub fn endpoint_url(&self, path: &str) -> Result<String, Error> {
        if path.contains("://") {
            return Err(InvalidInputError::Other {
                message: format!("expected a server-relative path, got '{path}'"),
            }
            .into());
        }
        Ok(format!("{}{}", self.base(), Self::normalize_path(path)))
    }

    /// Returns the base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.base()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ServerUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let Some(host) = url.host_str().filter(|h| !h.is_empty()) else {
            return Err(InvalidInputError::ServerUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        };

        let scheme = url.scheme();
        let is_localhost = matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ServerUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base())
    }
}

impl FromStr for ServerUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServerUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.base())
    }
}

impl<'de> Deserialize<'de> for ServerUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServerUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ServerUrl {
    fn as_ref(&self) -> &str {
        self.base()
    }
}
