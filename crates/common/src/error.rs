//! Error types for inkdash.
//!
//! Every error carries:
//! - **code**: machine-readable error code (e.g. `UPSTREAM_STATUS`)
//! - **category**: error class (`upstream`, `config`, `system`)
//! - the upstream `url` and HTTP `status` when the failure came from a fetch
//!
//! JSON failure body served by the backend:
//! ```json
//! {
//!   "ok": false,
//!   "chain": "Ink",
//!   "error": {
//!     "code": "UPSTREAM_STATUS",
//!     "message": "Upstream returned HTTP 503 for https://api.llama.fi/protocols",
//!     "category": "upstream",
//!     "url": "https://api.llama.fi/protocols",
//!     "status": 503
//!   }
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

/// Error category. Determines the CLI exit code.
///
/// Exit codes:
/// - `0`: success
/// - `1`: configuration error
/// - `2`: upstream error
/// - `3`: system error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Upstream,
    System,
}

impl ErrorCategory {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCategory::Config => 1,
            ErrorCategory::Upstream => 2,
            ErrorCategory::System => 3,
        }
    }
}

/// Structured error detail for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub category: ErrorCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[derive(Debug, Error)]
pub enum InkError {
    // ── Upstream ─────────────────────────────────────────────────────
    #[error("Upstream unreachable ({url}): {message}")]
    UpstreamUnreachable { url: String, message: String },

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Malformed upstream payload from {url}: {message}")]
    MalformedPayload { url: String, message: String },

    // ── Config ───────────────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // ── System ───────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InkError {
    /// Get the structured error detail for JSON output.
    pub fn detail(&self) -> ErrorDetail {
        match self {
            InkError::UpstreamUnreachable { url, .. } => ErrorDetail {
                code: "UPSTREAM_UNREACHABLE".into(),
                message: self.to_string(),
                category: ErrorCategory::Upstream,
                url: Some(url.clone()),
                // 0 mirrors the status reported when no response arrived at all
                status: Some(0),
            },
            InkError::UpstreamStatus { url, status } => ErrorDetail {
                code: "UPSTREAM_STATUS".into(),
                message: self.to_string(),
                category: ErrorCategory::Upstream,
                url: Some(url.clone()),
                status: Some(*status),
            },
            InkError::MalformedPayload { url, .. } => ErrorDetail {
                code: "MALFORMED_PAYLOAD".into(),
                message: self.to_string(),
                category: ErrorCategory::Upstream,
                url: Some(url.clone()),
                status: None,
            },
            InkError::InvalidConfig(msg) => ErrorDetail {
                code: "INVALID_CONFIG".into(),
                message: msg.clone(),
                category: ErrorCategory::Config,
                url: None,
                status: None,
            },
            InkError::Config(msg) => ErrorDetail {
                code: "CONFIG_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::Config,
                url: None,
                status: None,
            },
            InkError::Internal(msg) => ErrorDetail {
                code: "INTERNAL_ERROR".into(),
                message: msg.clone(),
                category: ErrorCategory::System,
                url: None,
                status: None,
            },
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.detail().category.exit_code()
    }

    /// Failure envelope for a chain-scoped endpoint.
    pub fn to_json(&self, chain: &str) -> serde_json::Value {
        serde_json::json!({
            "ok": false,
            "chain": chain,
            "error": self.detail(),
        })
    }
}

pub type InkResult<T> = Result<T, InkError>;
