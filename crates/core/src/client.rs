//! DefiLlama HTTP client and endpoint catalogue.
//!
//! All requests go through one `reqwest::Client` with a fixed timeout, and a
//! semaphore caps how many are in flight at once so a large enrichment
//! batch cannot flood the public API. No retries: a failed request is
//! reported once and the caller treats it as missing data.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use tracing::debug;
use url::Url;

use inkdash_common::error::{InkError, InkResult};
use inkdash_common::traits::{Fetched, Upstream};

use crate::config::UpstreamConfig;

/// URL builder for the aggregation API. Path parameters are percent-encoded
/// as single segments.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(base: &str) -> InkResult<Self> {
        let base = Url::parse(base.trim())
            .map_err(|e| InkError::InvalidConfig(format!("upstream base url '{base}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(InkError::InvalidConfig(format!(
                "upstream base url '{base}' cannot carry a path"
            )));
        }
        Ok(Self { base })
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Bulk protocol listing.
    pub fn protocols(&self) -> String {
        self.join(&["protocols"]).into()
    }

    /// Per-protocol detail with chain-scoped TVL history.
    pub fn protocol(&self, slug: &str) -> String {
        self.join(&["protocol", slug]).into()
    }

    pub fn fees_summary(&self, slug: &str) -> String {
        self.join(&["summary", "fees", slug]).into()
    }

    pub fn fees_summary_data_type(&self, slug: &str, data_type: &str) -> String {
        let mut url = self.join(&["summary", "fees", slug]);
        url.query_pairs_mut().append_pair("dataType", data_type);
        url.into()
    }

    pub fn revenue_summary(&self, slug: &str) -> String {
        self.join(&["summary", "revenue", slug]).into()
    }

    pub fn dexs_summary(&self, slug: &str) -> String {
        self.join(&["summary", "dexs", slug]).into()
    }

    /// Current TVL of every chain.
    pub fn chains(&self) -> String {
        self.join(&["v2", "chains"]).into()
    }

    pub fn historical_chain_tvl(&self, chain_slug: &str) -> String {
        self.join(&["v2", "historicalChainTvl", chain_slug]).into()
    }

    /// Resolve a fixture key: absolute URLs pass through, `/paths` are
    /// joined onto the base.
    pub fn resolve(&self, key: &str) -> String {
        if key.starts_with('/') {
            let mut url = self.base.clone();
            let base_path = url.path().trim_end_matches('/').to_string();
            let (path, query) = match key.split_once('?') {
                Some((p, q)) => (p, Some(q)),
                None => (key, None),
            };
            url.set_path(&format!("{base_path}{path}"));
            url.set_query(query);
            url.into()
        } else {
            key.to_string()
        }
    }
}

/// Live client for the DefiLlama API.
pub struct LlamaClient {
    http: reqwest::Client,
    base_url: String,
    permits: Semaphore,
}

impl LlamaClient {
    pub fn new(config: &UpstreamConfig) -> InkResult<Self> {
        // Reject a bad base url up front rather than on the first request.
        Endpoints::new(&config.base_url)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("inkdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InkError::Internal(format!("Failed to build HTTP client: {e}")))?;

        debug!(base_url = %config.base_url, max_in_flight = config.max_in_flight, "llama client initialized");

        Ok(Self {
            http,
            base_url: config.base_url.trim().to_string(),
            permits: Semaphore::new(config.max_in_flight.max(1)),
        })
    }
}

#[async_trait]
impl Upstream for LlamaClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch(&self, url: &str) -> InkResult<Fetched> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| InkError::Internal("request limiter closed".into()))?;

        let unreachable = |e: reqwest::Error| InkError::UpstreamUnreachable {
            url: url.to_string(),
            message: e.to_string(),
        };

        let resp = self.http.get(url).send().await.map_err(unreachable)?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(unreachable)?;
        debug!(url, status, bytes = text.len(), "GET");

        Ok(Fetched::from_body(url, status, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://api.llama.fi").unwrap()
    }

    #[test]
    fn test_endpoint_paths() {
        let e = endpoints();
        assert_eq!(e.protocols(), "https://api.llama.fi/protocols");
        assert_eq!(e.protocol("foo"), "https://api.llama.fi/protocol/foo");
        assert_eq!(e.fees_summary("foo"), "https://api.llama.fi/summary/fees/foo");
        assert_eq!(e.dexs_summary("foo"), "https://api.llama.fi/summary/dexs/foo");
        assert_eq!(e.revenue_summary("foo"), "https://api.llama.fi/summary/revenue/foo");
        assert_eq!(e.chains(), "https://api.llama.fi/v2/chains");
        assert_eq!(
            e.historical_chain_tvl("ink"),
            "https://api.llama.fi/v2/historicalChainTvl/ink"
        );
        assert_eq!(
            e.fees_summary_data_type("foo", "revenue"),
            "https://api.llama.fi/summary/fees/foo?dataType=revenue"
        );
    }

    #[test]
    fn test_slug_is_one_encoded_segment() {
        let e = endpoints();
        assert_eq!(e.protocol("a/b c"), "https://api.llama.fi/protocol/a%2Fb%20c");
    }

    #[test]
    fn test_base_with_path_and_trailing_slash() {
        let e = Endpoints::new("http://localhost:8080/llama/").unwrap();
        assert_eq!(e.protocols(), "http://localhost:8080/llama/protocols");
        assert_eq!(e.resolve("/v2/chains"), "http://localhost:8080/llama/v2/chains");
    }

    #[test]
    fn test_resolve_keeps_query_and_absolute() {
        let e = endpoints();
        assert_eq!(
            e.resolve("/summary/fees/foo?dataType=revenue"),
            e.fees_summary_data_type("foo", "revenue")
        );
        assert_eq!(e.resolve("https://x.test/a"), "https://x.test/a");
    }

    #[test]
    fn test_invalid_base_rejected() {
        assert!(matches!(Endpoints::new("not a url"), Err(InkError::InvalidConfig(_))));
        assert!(Endpoints::new("mailto:a@b.c").is_err());
    }

    #[test]
    fn test_client_rejects_bad_base() {
        let cfg = UpstreamConfig { base_url: "::".into(), ..Default::default() };
        assert!(LlamaClient::new(&cfg).is_err());
    }
}
