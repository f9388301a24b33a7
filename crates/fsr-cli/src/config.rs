//! CLI configuration file and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;

use fsr_core::Credential;
use fsr_http::FortiSoar;

/// Environment variable overriding the server address.
pub const ENV_BASE_URL: &str = "FSR_BASE_URL";
/// Environment variable overriding the API key.
pub const ENV_API_KEY: &str = "FSR_API_KEY";
/// Environment variable overriding the username.
pub const ENV_USERNAME: &str = "FSR_USERNAME";
/// Environment variable overriding the password.
pub const ENV_PASSWORD: &str = "FSR_PASSWORD";

/// Contents of `config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fortisoar: ServerSection,
}

/// The `[fortisoar]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    pub base_url: Option<String>,
    pub verify_ssl: Option<bool>,
    #[serde(default)]
    pub auth: AuthSection,
}

/// The `[fortisoar.auth]` table.
#[derive(Default, Deserialize)]
pub struct AuthSection {
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("AuthSection")
            .field("api_key", &redact(&self.api_key))
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .finish()
    }
}

impl Config {
    /// Default location of the configuration file.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "fsr").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. The default path is optional; without it
    /// everything has to come from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => {
                    debug!("no config file, using environment only");
                    return Ok(Self::default());
                }
            },
        };

        debug!(path = %path.display(), "loading config");
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `FSR_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok().filter(|v| !v.is_empty()));
    }

    /// Apply overrides from any variable source.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let server = &mut self.fortisoar;
        if let Some(url) = lookup(ENV_BASE_URL) {
            debug!("server address overridden from the environment");
            server.base_url = Some(url);
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            server.auth.api_key = Some(key);
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            server.auth.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            server.auth.password = Some(password);
        }
    }

    /// The credential to use. An API key wins over username/password.
    pub fn credential(&self) -> Result<Credential> {
        let auth = &self.fortisoar.auth;
        if let Some(key) = &auth.api_key {
            return Ok(Credential::api_key(key.clone()));
        }
        match (&auth.username, &auth.password) {
            (Some(username), Some(password)) => {
                Ok(Credential::user_password(username.clone(), password.clone()))
            }
            (Some(_), None) => bail!("Password missing. Set [fortisoar.auth] password or {ENV_PASSWORD}."),
            (None, Some(_)) => bail!("Username missing. Set [fortisoar.auth] username or {ENV_USERNAME}."),
            _ => bail!(
                "No credentials configured. Set an API key ({ENV_API_KEY}) or username and password ({ENV_USERNAME}/{ENV_PASSWORD})."
            ),
        }
    }

    /// Build a client from this configuration.
    pub fn client(&self, insecure: bool) -> Result<FortiSoar> {
        let base_url = self.fortisoar.base_url.as_deref().with_context(|| {
            format!("No server configured. Set [fortisoar] base_url or {ENV_BASE_URL}.")
        })?;
        let verify_tls = !insecure && self.fortisoar.verify_ssl.unwrap_or(true);

        FortiSoar::builder(base_url, self.credential()?)
            .verify_tls(verify_tls)
            .build()
            .context("Failed to create client")
    }
}
