//! External lookup client
//!
//! Performs exactly one HTTP call per `request`. Non-success statuses become
//! `LookupError::Remote`, connection-level faults become
//! `LookupError::Transport`. Bodies that are not JSON are returned as text, so
//! callers expecting JSON must check the shape themselves.

use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::{LookupError, PipelineError};

const USER_AGENT: &str = concat!("simlr/", env!("CARGO_PKG_VERSION"));

/// Parsed response body
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Decode raw text, falling back to `Text` when it is not JSON
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(text),
        }
    }

    /// JSON value or `MalformedResponse` naming `context`
    pub fn into_json(self, context: &str) -> Result<Value, PipelineError> {
        match self {
            Body::Json(value) => Ok(value),
            Body::Text(_) => Err(PipelineError::MalformedResponse(format!(
                "{}: expected JSON body",
                context
            ))),
        }
    }

    /// Body as text (JSON is re-serialized)
    pub fn into_text(self) -> String {
        match self {
            Body::Json(value) => value.to_string(),
            Body::Text(text) => text,
        }
    }
}

/// Outbound request description
#[derive(Debug, Clone)]
pub struct LookupRequest {
    url: String,
    method: Method,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    form: Option<Vec<(String, String)>>,
    basic_auth: Option<(String, Option<String>)>,
}

impl LookupRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            query: Vec::new(),
            form: None,
            basic_auth: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Form-encoded request body
    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    pub fn basic_auth(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.basic_auth = Some((user.into(), password));
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Response of a successful lookup
#[derive(Debug, Clone)]
pub struct LookupResponse {
    pub status: u16,
    /// Location after redirects were followed
    pub final_url: String,
    pub body: Body,
}

/// Enforces a minimum spacing between requests of one client
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Wait if necessary to keep the spacing
    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// HTTP client shared by all lookups of a run
///
/// Cheap to clone; clones share the connection pool and the rate limiter.
#[derive(Clone)]
pub struct LookupClient {
    http_client: reqwest::Client,
    rate_limiter: Option<Arc<RateLimiter>>,
}

impl LookupClient {
    /// Create a client with a per-request timeout and optional request spacing
    pub fn new(timeout: Duration, min_interval: Duration) -> Result<Self, LookupError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let rate_limiter = if min_interval.is_zero() {
            None
        } else {
            Some(Arc::new(RateLimiter::new(min_interval)))
        };

        Ok(Self {
            http_client,
            rate_limiter,
        })
    }

    /// Issue one request
    pub async fn request(&self, request: LookupRequest) -> Result<LookupResponse, LookupError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        tracing::debug!(method = %request.method, url = %request.url, "Issuing lookup");

        let mut builder = self
            .http_client
            .request(request.method, &request.url)
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(fields) = &request.form {
            builder = builder.form(fields);
        }
        if let Some((user, password)) = request.basic_auth {
            builder = builder.basic_auth(user, password);
        }

        let response = builder.send().await?;
        let status = response.status();
        let final_url = response.url().to_string();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), url = %final_url, "Lookup rejected");
            return Err(LookupError::Remote {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(LookupResponse {
            status: status.as_u16(),
            final_url,
            body: Body::parse(text),
        })
    }
}
