//! Harness configuration: CLI flags merged over an optional TOML file.

mod file_config;

pub use file_config::FileConfig;

use crate::auth::Credentials;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_EMAIL: &str = "john.doe@example.com";
pub const DEFAULT_PASSWORD: &str = "password123";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Effective configuration after merging CLI, file, and defaults.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub request_timeout: Duration,
}

impl HarnessConfig {
    /// CLI values win over file values, file values over defaults.
    pub fn resolve(
        cli_base_url: Option<String>,
        cli_email: Option<String>,
        cli_password: Option<String>,
        cli_request_timeout_sec: Option<u64>,
        file: Option<FileConfig>,
    ) -> Self {
        let file = file.unwrap_or_default();
        Self {
            base_url: cli_base_url
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            email: cli_email
                .or(file.email)
                .unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
            password: cli_password
                .or(file.password)
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
            request_timeout: Duration::from_secs(
                cli_request_timeout_sec
                    .or(file.request_timeout_sec)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}
