//! Authentication header set.

use std::fmt;

use crate::credentials::ApiKeyCredential;
use crate::tokens::SessionToken;

/// Name of the header carrying credentials.
pub const AUTHORIZATION: &str = "Authorization";

/// Headers to attach to every authenticated request.
///
/// Always holds at least the `Authorization` header. Values are secrets and
/// are never shown in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeader {
    entries: Vec<(&'static str, String)>,
}

impl AuthHeader {
    /// Header for a stateless API key: `Authorization: API-KEY <key>`.
    pub fn api_key(credential: &ApiKeyCredential) -> Self {
        Self::authorization(format!("API-KEY {}", credential.key()))
    }

    /// Header for a login session: `Authorization: Bearer <token>`.
    pub fn bearer(token: &SessionToken) -> Self {
        Self::authorization(format!("Bearer {}", token.as_str()))
    }

    fn authorization(value: String) -> Self {
        Self {
            entries: vec![(AUTHORIZATION, value)],
        }
    }

    /// Returns the `Authorization` value.
    pub fn authorization_value(&self) -> &str {
        self.get(AUTHORIZATION).unwrap_or_default()
    }

    /// Look up a header value by (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(n, v)| (*n, v.as_str()))
    }

    /// Number of headers in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, _) in &self.entries {
            map.entry(name, &"[REDACTED]");
        }
        map.finish()
    }
}
