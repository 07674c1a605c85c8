//! HTTP transport seam.
//!
//! Requests and responses cross this boundary as plain data. The client
//! builds an [`HttpRequest`], a [`Transport`] executes it, and the response
//! mapper interprets the returned [`HttpResponse`]. Status codes are not
//! judged here; only failures to complete the exchange are errors.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use url::Url;

use crate::error::Result;

/// An HTTP request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// A completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response from a status and raw body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response carrying a JSON document.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes HTTP requests.
///
/// Implementations must not retry; each call is a single exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the response, whatever its status.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

// ─────────────────────────────────────────────────────────────────────────────
// reqwest transport
// ─────────────────────────────────────────────────────────────────────────────

/// Default transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with the given per-request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { http, timeout })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .timeout(self.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mock transport
// ─────────────────────────────────────────────────────────────────────────────

/// A mock transport for testing purposes.
///
/// Returns pre-configured responses in order and records every request.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: std::sync::Mutex<Vec<HttpResponse>>,
    request_log: std::sync::Mutex<Vec<HttpRequest>>,
}

#[cfg(any(test, feature = "testing"))]
impl MockTransport {
    /// Create a mock transport with the given responses.
    pub fn new(responses: Vec<HttpResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            request_log: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock transport answering once with a JSON document.
    pub fn with_json(value: serde_json::Value) -> Self {
        Self::new(vec![HttpResponse::json(&value)])
    }

    /// Queue another response.
    pub fn push(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push(response);
    }

    /// Get all requests that were sent.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.request_log.lock().unwrap().clone()
    }

    /// Get the most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.request_log.lock().unwrap().last().cloned()
    }
}

#[cfg(any(test, feature = "testing"))]
#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.request_log.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(crate::error::Error::Api {
                status: 500,
                message: "MockTransport: no more responses available".to_string(),
            });
        }
        Ok(responses.remove(0))
    }
}
