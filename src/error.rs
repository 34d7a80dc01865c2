//! Error types shared across the client, the document adapter and the dashboard.

use thiserror::Error;

/// Failures talking to the benchmark service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request never completed (connect, DNS, reset, body read)
    #[error("network failure: {0}")]
    Network(String),

    /// Non-2xx status
    #[error("HTTP error: {status}")]
    Http { status: u16, body: String },

    /// Body could not be parsed or lacks required fields
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Malformed(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Malformed(err.to_string())
    }
}

/// Failures against the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    #[error("element not found: #{0}")]
    MissingElement(String),

    #[error("unknown chart handle {0}")]
    UnknownChart(u64),
}

/// Failures while composing a submission.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error(transparent)]
    Ui(#[from] UiError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("unknown test kind: {0}")]
    UnknownTestKind(String),

    #[error("invalid API base {0}: {1}")]
    InvalidBase(String, String),
}
