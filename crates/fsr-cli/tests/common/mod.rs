//! Helpers for running the `fsr` binary against a mock server.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Output;

use tokio::process::Command;
use wiremock::MockServer;

pub const API_KEY: &str = "Zk9yVGlTT0FSa2V5MTIzNDU2";
pub const USERNAME: &str = "csadmin";
pub const PASSWORD: &str = "changeme";

const FSR_ENV: [&str; 4] = ["FSR_BASE_URL", "FSR_API_KEY", "FSR_USERNAME", "FSR_PASSWORD"];

pub fn mock_server_url(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}", server.address().port())
}

/// Write a config file using username/password authentication.
pub fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        "[fortisoar]\nbase_url = \"{base_url}\"\n\n[fortisoar.auth]\nusername = \"{USERNAME}\"\npassword = \"{PASSWORD}\"\n"
    );
    std::fs::write(&path, content).expect("Failed to write config");
    path
}

/// Run the CLI with an isolated HOME and no inherited `FSR_*` variables.
pub async fn run_cli_with_env(args: &[&str], home: &Path, env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fsr"));
    cmd.args(args);
    cmd.current_dir(home);
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    for name in FSR_ENV {
        cmd.env_remove(name);
    }
    for (name, value) in env {
        cmd.env(name, value);
    }
    cmd.output().await.expect("Failed to execute CLI")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], home: &Path, env: &[(&str, &str)]) -> String {
    let output = run_cli_with_env(args, home, env).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run the CLI and expect failure, returning stderr.
pub async fn run_cli_failure(args: &[&str], home: &Path, env: &[(&str, &str)]) -> String {
    let output = run_cli_with_env(args, home, env).await;
    if output.status.success() {
        panic!("CLI command should have failed: {:?}", args);
    }
    String::from_utf8_lossy(&output.stderr).to_string()
}
