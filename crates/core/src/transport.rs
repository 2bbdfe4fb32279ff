use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

use crate::catalog::HttpMethod;
use crate::config::PerfexConfig;
use crate::errors::TransportError;

/// The one outbound call a tool invocation makes.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Already percent-encoded, relative to the API base URL.
    pub path: String,
    pub body: Option<Value>,
}

#[async_trait]
pub trait CrmTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

/// reqwest-backed transport: one client, base URL and `authtoken` header
/// fixed at construction.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &PerfexConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|error| TransportError::Request(format!("invalid api key header: {error}")))?;
        token.set_sensitive(true);
        headers.insert("authtoken", token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|error| TransportError::Request(error.to_string()))?;

        Ok(Self { client, base_url: config.api_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// JSON when it parses, the raw text otherwise, `null` when empty.
fn parse_body(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[async_trait]
impl CrmTransport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self.url_for(&request.path);
        debug!(
            event_name = "perfex.transport.request",
            method = %request.method,
            url = %url,
            "sending perfex api request"
        );

        let mut builder = self.client.request(reqwest_method(request.method), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response =
            builder.send().await.map_err(|error| TransportError::Request(error.to_string()))?;
        let status = response.status();
        let raw =
            response.text().await.map_err(|error| TransportError::Request(error.to_string()))?;
        let body = parse_body(&raw);

        debug!(
            event_name = "perfex.transport.response",
            status = status.as_u16(),
            "received perfex api response"
        );

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().map(str::to_string),
                body,
            });
        }

        Ok(body)
    }
}
