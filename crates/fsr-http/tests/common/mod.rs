//! Shared helpers for the mock server tests.

#![allow(dead_code)]

use std::time::Duration;

use fsr_core::{Credential, ServerUrl};
use fsr_http::{ClientConfig, FortiSoar, HttpClient};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "Zk9yVGlTT0FSa2V5MTIzNDU2";
pub const USERNAME: &str = "csadmin";
pub const PASSWORD: &str = "changeme";
pub const LOGIN_PATH: &str = "/auth/authenticate";

/// Base URL of a mock server. Plain HTTP is allowed for 127.0.0.1.
pub fn mock_server_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}", server.address().port())
}

pub fn http_client(server: &MockServer) -> HttpClient {
    let url = ServerUrl::new(mock_server_url(server)).unwrap();
    HttpClient::new(url, &ClientConfig::default()).unwrap()
}

pub fn user_client(server: &MockServer) -> FortiSoar {
    FortiSoar::builder(
        mock_server_url(server),
        Credential::user_password(USERNAME, PASSWORD),
    )
    .poll_interval(Duration::from_millis(10))
    .build()
    .unwrap()
}

pub fn key_client(server: &MockServer) -> FortiSoar {
    FortiSoar::new(mock_server_url(server), Credential::api_key(API_KEY)).unwrap()
}

/// Login endpoint answering with `token`, expected exactly `times` times.
pub async fn mount_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_json(json!({
            "credentials": {"loginid": USERNAME, "password": PASSWORD}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": token})))
        .expect(times)
        .mount(server)
        .await;
}

/// Login endpoint that must never be called.
pub async fn forbid_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
