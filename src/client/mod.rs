//! Thin HTTP client adapter for the RecipeBook API.
//!
//! Issues GET/POST/PUT/DELETE requests with headers and JSON bodies against
//! a base URL and hands back the status code plus the raw body. There are no
//! retries and no timeout policy beyond the configured transport default:
//! any transport-level fault surfaces as a test failure.

use crate::error::HarnessError;
use crate::validators::AssertionError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A fully described request against the RecipeBook API.
///
/// Path parameters are substituted (percent-encoded) into the path template
/// before dispatch, e.g. `/recipe/{id}` with `("id", "abc")`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: &'static str,
    path_params: Vec<(&'static str, String)>,
    bearer_token: Option<String>,
    json_body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            path_params: Vec::new(),
            bearer_token: None,
            json_body: None,
        }
    }

    pub fn path_param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.path_params.push((name, value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.json_body = Some(serde_json::to_value(body).expect("Failed to serialize JSON body"));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn json_body(&self) -> Option<&Value> {
        self.json_body.as_ref()
    }

    /// Resolves the path template into a concrete request path.
    pub fn resolved_path(&self) -> String {
        let mut path = self.path.to_string();
        for (name, value) in &self.path_params {
            let placeholder = format!("{{{}}}", name);
            path = path.replace(&placeholder, &urlencoding::encode(value));
        }
        path
    }
}

/// Raw response from the API: status code plus the unparsed body.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn require_success(&self) -> Result<(), AssertionError> {
        if self.is_success() {
            Ok(())
        } else {
            Err(AssertionError::UnexpectedStatus {
                expected: "2xx".to_string(),
                actual: self.status.to_string(),
                body: self.body.clone(),
            })
        }
    }

    pub fn require_status(&self, expected: StatusCode) -> Result<(), AssertionError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(AssertionError::UnexpectedStatus {
                expected: expected.to_string(),
                actual: self.status.to_string(),
                body: self.body.clone(),
            })
        }
    }

    /// Parses the body as JSON, reporting the raw body on failure.
    pub fn json(&self) -> Result<Value, AssertionError> {
        serde_json::from_str(&self.body).map_err(|e| AssertionError::InvalidJson {
            detail: e.to_string(),
            body: self.body.clone(),
        })
    }
}

/// HTTP client bound to one RecipeBook server.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the server under test (e.g., "http://localhost:3000")
    /// * `timeout` - Request timeout for every call
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Dispatches a request and collects the full response body.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, HarnessError> {
        let url = format!("{}{}", self.base_url, request.resolved_path());
        debug!(method = %request.method(), %url, "dispatching request");

        let mut builder = self.client.request(request.method().clone(), &url);
        if let Some(token) = request.bearer_token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = request.json_body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|source| HarnessError::Transport {
            method: request.method().clone(),
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| HarnessError::Transport {
                method: request.method().clone(),
                url,
                source,
            })?;

        Ok(ApiResponse { status, body })
    }
}
