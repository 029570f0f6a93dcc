//! Upstream trait: the seam between the normalizer and the network.
//!
//! The core pipeline never talks to reqwest directly. It asks an
//! [`Upstream`] for a URL and gets back a [`Fetched`] describing what came
//! back, so a recorded fixture can stand in for the live API.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::InkResult;

/// A completed HTTP exchange with the aggregation API.
///
/// `json` is `None` when the body was not valid JSON; `text` keeps the raw
/// body for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct Fetched {
    pub url: String,
    pub status: u16,
    pub ok: bool,
    pub text: Option<String>,
    pub json: Option<serde_json::Value>,
}

impl Fetched {
    /// Build from a status and raw body, parsing JSON leniently.
    pub fn from_body(url: impl Into<String>, status: u16, text: String) -> Self {
        let json = serde_json::from_str(&text).ok();
        Self {
            url: url.into(),
            status,
            ok: (200..300).contains(&status),
            text: Some(text),
            json,
        }
    }

    /// Build a 200 response around an already-parsed payload.
    pub fn ok_json(url: impl Into<String>, json: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            status: 200,
            ok: true,
            text: Some(json.to_string()),
            json: Some(json),
        }
    }

    /// The parsed payload, only when the response was a 2xx.
    pub fn success_json(&self) -> Option<&serde_json::Value> {
        if self.ok {
            self.json.as_ref()
        } else {
            None
        }
    }
}

/// Read-only access to the aggregation API.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Base URL that endpoint paths are joined onto.
    fn base_url(&self) -> &str;

    /// GET a URL. `Err` means no response was received at all
    /// (connection failure, timeout); any received response is `Ok`,
    /// whatever its status or body.
    async fn fetch(&self, url: &str) -> InkResult<Fetched>;
}
