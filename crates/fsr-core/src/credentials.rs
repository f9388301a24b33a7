//! Credential types and local validation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::auth::AuthScheme;
use crate::error::{Error, InvalidInputError, ValidationError};

/// Default shape of an API key: at least eight URL-safe token characters.
pub const DEFAULT_API_KEY_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9._~+/=-]{7,}$";

static DEFAULT_API_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_API_KEY_PATTERN).expect("default API key pattern is a valid regex")
});

/// The rule an API key must satisfy before it is sent anywhere.
///
/// The server's exact key format is deployment specific, so the rule is a
/// regular expression that callers can replace.
///
/// # Example
///
/// ```
/// use fsr_core::ApiKeyFormat;
///
/// let format = ApiKeyFormat::new(r"^[0-9a-f]{32}$").unwrap();
/// assert!(format.matches("0123456789abcdef0123456789abcdef"));
/// assert!(!format.matches("not-hex"));
/// ```
#[derive(Clone)]
pub struct ApiKeyFormat {
    pattern: Regex,
}

impl ApiKeyFormat {
    /// Build a format from a regular expression.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self, Error> {
        let pattern = Regex::new(pattern).map_err(|e| InvalidInputError::KeyPattern {
            value: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// Returns true if `key` has the expected shape.
    pub fn matches(&self, key: &str) -> bool {
        self.pattern.is_match(key)
    }

    /// Returns the underlying pattern.
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Default for ApiKeyFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_API_KEY_REGEX.clone(),
        }
    }
}

impl fmt::Debug for ApiKeyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKeyFormat")
            .field(&self.pattern.as_str())
            .finish()
    }
}

/// A FortiSOAR API key.
#[derive(Clone)]
pub struct ApiKeyCredential {
    key: String,
    format: ApiKeyFormat,
}

impl ApiKeyCredential {
    /// Create an API key credential checked against the default format.
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_format(key, ApiKeyFormat::default())
    }

    /// Create an API key credential checked against a custom format.
    pub fn with_format(key: impl Into<String>, format: ApiKeyFormat) -> Self {
        Self {
            key: key.into(),
            format,
        }
    }

    /// Check the key shape without touching the network.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] for a blank key,
    /// [`ValidationError::InvalidFormat`] if the key does not match the format.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.trim().is_empty() {
            return Err(ValidationError::Empty);
        }
        if !self.format.matches(&self.key) {
            return Err(ValidationError::InvalidFormat);
        }
        Ok(())
    }

    /// Returns the format this key is checked against.
    pub fn format(&self) -> &ApiKeyFormat {
        &self.format
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for ApiKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredential")
            .field("key", &"[REDACTED]")
            .field("format", &self.format)
            .finish()
    }
}

/// Username and password for the login exchange.
#[derive(Clone)]
pub struct UserPassCredential {
    username: String,
    password: String,
}

impl UserPassCredential {
    /// Create new username/password credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the login id.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing the login request.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Check both fields are present.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.username.trim().is_empty() {
            return Err(ValidationError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        Ok(())
    }
}

impl fmt::Debug for UserPassCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassCredential")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The credential a client authenticates with. Exactly one scheme per client.
///
/// # Example
///
/// ```
/// use fsr_core::{AuthScheme, Credential};
///
/// let creds = Credential::user_password("csadmin", "changeme");
/// assert_eq!(creds.scheme(), AuthScheme::UserPassword);
/// assert!(creds.validate().is_ok());
///
/// let key = Credential::api_key("");
/// assert!(key.validate().is_err());
/// ```
#[derive(Debug, Clone)]
pub enum Credential {
    /// Stateless API key.
    ApiKey(ApiKeyCredential),
    /// Username and password exchanged for a session token.
    UserPassword(UserPassCredential),
}

impl Credential {
    /// API key credential with the default key format.
    pub fn api_key(key: impl Into<String>) -> Self {
        Credential::ApiKey(ApiKeyCredential::new(key))
    }

    /// Username/password credential.
    pub fn user_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential::UserPassword(UserPassCredential::new(username, password))
    }

    /// Returns the scheme this credential uses.
    pub fn scheme(&self) -> AuthScheme {
        match self {
            Credential::ApiKey(_) => AuthScheme::ApiKey,
            Credential::UserPassword(_) => AuthScheme::UserPassword,
        }
    }

    /// Validate the credential locally.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the active variant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Credential::ApiKey(key) => key.validate(),
            Credential::UserPassword(creds) => creds.validate(),
        }
    }
}

impl From<ApiKeyCredential> for Credential {
    fn from(value: ApiKeyCredential) -> Self {
        Credential::ApiKey(value)
    }
}

impl From<UserPassCredential> for Credential {
    fn from(value: UserPassCredential) -> Self {
        Credential::UserPassword(value)
    }
}
