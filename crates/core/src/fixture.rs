//! In-memory upstream for tests and offline replay.
//!
//! A fixture file is a JSON object mapping upstream URLs (or `/paths`
//! relative to the base URL) to the payload served for them:
//!
//! ```json
//! {
//!   "/protocols": [{"name": "Foo", "slug": "foo", "chains": ["Ink"]}],
//!   "/summary/fees/foo": {"total24h": 12}
//! }
//! ```
//!
//! Every listed payload is served with status 200. URLs not in the map
//! answer 404.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use inkdash_common::error::{InkError, InkResult};
use inkdash_common::traits::{Fetched, Upstream};

use crate::client::Endpoints;

enum Canned {
    Response(Fetched),
    Unreachable(String),
}

pub struct StaticUpstream {
    base_url: String,
    endpoints: Endpoints,
    responses: HashMap<String, Canned>,
    delays: HashMap<String, Duration>,
    log: Mutex<Vec<String>>,
}

impl StaticUpstream {
    pub fn new(base_url: &str) -> InkResult<Self> {
        Ok(Self {
            base_url: base_url.to_string(),
            endpoints: Endpoints::new(base_url)?,
            responses: HashMap::new(),
            delays: HashMap::new(),
            log: Mutex::new(Vec::new()),
        })
    }

    /// Serve `json` with status 200.
    pub fn with_json(mut self, key: &str, json: Value) -> Self {
        let url = self.endpoints.resolve(key);
        self.responses
            .insert(url.clone(), Canned::Response(Fetched::ok_json(url, json)));
        self
    }

    /// Serve a raw body with an arbitrary status.
    pub fn with_status(mut self, key: &str, status: u16, body: &str) -> Self {
        let url = self.endpoints.resolve(key);
        self.responses.insert(
            url.clone(),
            Canned::Response(Fetched::from_body(url, status, body.to_string())),
        );
        self
    }

    /// Fail the request as if the host could not be reached.
    pub fn with_unreachable(mut self, key: &str) -> Self {
        let url = self.endpoints.resolve(key);
        self.responses
            .insert(url, Canned::Unreachable("connection refused".into()));
        self
    }

    /// Hold the response for `delay` before answering.
    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(self.endpoints.resolve(key), delay);
        self
    }

    pub fn from_fixture_str(base_url: &str, raw: &str) -> InkResult<Self> {
        let parsed: Value = serde_json::from_str(raw).map_err(|e| InkError::Config(format!("fixture: {e}")))?;
        let Value::Object(entries) = parsed else {
            return Err(InkError::Config(
                "fixture must be a JSON object of url -> payload".into(),
            ));
        };
        Ok(entries
            .into_iter()
            .fold(Self::new(base_url)?, |up, (key, payload)| up.with_json(&key, payload)))
    }

    pub fn from_fixture_file(base_url: &str, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        let upstream = Self::from_fixture_str(base_url, &raw)
            .with_context(|| format!("Invalid fixture {}", path.display()))?;
        Ok(upstream)
    }

    /// URLs requested so far, in call order.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Upstream for StaticUpstream {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, url: &str) -> InkResult<Fetched> {
        if let Ok(mut log) = self.log.lock() {
            log.push(url.to_string());
        }
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        match self.responses.get(url) {
            Some(Canned::Response(fetched)) => Ok(fetched.clone()),
            Some(Canned::Unreachable(message)) => Err(InkError::UpstreamUnreachable {
                url: url.to_string(),
                message: message.clone(),
            }),
            None => Ok(Fetched::from_body(url, 404, "{\"message\":\"not found\"}".into())),
        }
    }
}
