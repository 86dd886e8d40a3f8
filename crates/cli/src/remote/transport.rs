// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the remote REST API.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP requests for production
//! - Mock transports for unit testing
//!
//! A transport only moves bytes. It returns every HTTP response, whatever
//! the status; interpreting statuses is the client's job.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::config::RemoteConfig;

/// Error type for remote operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The backend answered with a non-2xx status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Network failure, timeout, or a client that could not be built.
    #[error("request failed: {0}")]
    Transport(String),

    /// A 2xx response whose body was not what the call expected.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// HTTP method used by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One REST call against a resource collection.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: Method,
    /// Collection name, e.g. `groups`.
    pub resource: String,
    /// Query pairs, e.g. `("id", "eq.g-1")`.
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Value of the `Prefer` header, if any.
    pub prefer: Option<String>,
}

impl RemoteRequest {
    pub fn new(method: Method, resource: impl Into<String>) -> Self {
        RemoteRequest {
            method,
            resource: resource.into(),
            query: Vec::new(),
            body: None,
            prefer: None,
        }
    }

    /// Adds a query pair (builder pattern).
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the JSON body (builder pattern).
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the `Prefer` header (builder pattern).
    pub fn with_prefer(mut self, prefer: impl Into<String>) -> Self {
        self.prefer = Some(prefer.into());
        self
    }

    /// Value of a query key, if present.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RemoteResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport trait for REST communication.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Execute one request and return the response, whatever its status.
    fn execute(
        &self,
        request: RemoteRequest,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<RemoteResponse>> + Send + '_>>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    api_key: String,
}

impl HttpTransport {
    /// Build a transport from the remote configuration.
    pub fn new(config: &RemoteConfig) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("gsync/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(HttpTransport {
            client,
            base_url: config.rest_base(),
            service_key: config.service_key.clone(),
            api_key: config.api_key().to_string(),
        })
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        request: RemoteRequest,
    ) -> Pin<Box<dyn Future<Output = RemoteResult<RemoteResponse>> + Send + '_>> {
        Box::pin(async move {
            let url = format!("{}/{}", self.base_url, request.resource);
            tracing::debug!(method = %request.method, %url, query = ?request.query, "remote request");

            let mut builder = self
                .client
                .request(Self::method(request.method), &url)
                .query(&request.query)
                .bearer_auth(&self.service_key)
                .header("apikey", &self.api_key);
            if let Some(prefer) = &request.prefer {
                builder = builder.header("Prefer", prefer);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Transport(format!("timed out: {e}"))
                } else {
                    RemoteError::Transport(e.to_string())
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| RemoteError::Transport(e.to_string()))?;
            Ok(RemoteResponse { status, body })
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
