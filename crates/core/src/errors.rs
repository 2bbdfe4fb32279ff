use serde_json::Value;
use thiserror::Error;

use crate::schema::truthy_text;

/// Terminal failure of a single tool invocation or resource read.
///
/// None of these are retried locally. Business failures reported by the CRM
/// itself are not errors; they come back as `ToolOutput { is_error: true, .. }`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("{0}")]
    InvalidParams(String),
    #[error("{0}")]
    MethodNotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ToolError {
    /// JSON-RPC error code for this failure class.
    pub fn error_code(&self) -> i32 {
        match self {
            Self::InvalidRequest(_) => -32600,
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Internal(_) => -32603,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidParams(_) => "invalid_params",
            Self::MethodNotFound(_) => "method_not_found",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidRequest(message)
            | Self::InvalidParams(message)
            | Self::MethodNotFound(message)
            | Self::Internal(message) => message,
        }
    }
}

/// Failure raised while talking to the CRM over HTTP.
#[derive(Clone, Debug, Error)]
pub enum TransportError {
    /// The CRM answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, reason: Option<String>, body: Value },
    /// No usable response: connect/TLS/IO failure or an unreadable body.
    #[error("{0}")]
    Request(String),
}

impl TransportError {
    /// Human-readable detail, preferring what the CRM said over what the
    /// transport saw: `body.message`, then a raw string body, then the
    /// transport message.
    pub fn remote_message(&self) -> String {
        match self {
            Self::Status { body, .. } => {
                if let Some(message) = truthy_text(body.get("message")) {
                    return message;
                }
                match body {
                    Value::String(raw) if !raw.is_empty() => raw.clone(),
                    _ => self.to_string(),
                }
            }
            Self::Request(message) => message.clone(),
        }
    }
}
