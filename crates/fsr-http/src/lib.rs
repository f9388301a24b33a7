//! fsr-http - FortiSOAR REST client.
//!
//! [`FortiSoar`] pairs a server address with one credential. API keys are
//! sent as a static header; username/password credentials log in on first
//! use and the session is refreshed once when the server answers 401.

pub mod api;
mod auth;
mod client;
mod config;
pub mod http;

pub use auth::Authenticator;
pub use client::{FortiSoar, FortiSoarBuilder};
pub use config::{ClientConfig, DEFAULT_LOGIN_PATH};
pub use http::{ApiRequest, ApiResponse, HttpClient, ResponseBody};
