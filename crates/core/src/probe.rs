//! Raw fee/revenue payloads for one protocol, for diagnosing how a
//! protocol reports its figures.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use inkdash_common::error::InkResult;
use inkdash_common::traits::Upstream;

use crate::client::Endpoints;

/// `dataType` values tried against the fees summary.
pub const REVENUE_DATA_TYPES: &[&str] = &["revenue", "protocolRevenue", "ProtocolRevenue"];

/// One probed URL as received. A transport failure is reported with
/// status 0 and the error message.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub ok: bool,
    pub status: u16,
    pub text: Option<String>,
    pub json: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub ok: bool,
    /// The probed slug.
    pub debug: String,
    pub fees: ProbeResult,
    pub revenue: Vec<ProbeResult>,
}

async fn probe(upstream: &dyn Upstream, url: String) -> ProbeResult {
    match upstream.fetch(&url).await {
        Ok(f) => ProbeResult {
            url: f.url,
            ok: f.ok,
            status: f.status,
            text: f.text,
            json: f.json,
            error: None,
        },
        Err(e) => {
            debug!(url = %url, error = %e, "probe failed");
            ProbeResult {
                url,
                ok: false,
                status: 0,
                text: None,
                json: None,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Fetch the fees summary plus every revenue variant. Individual failures
/// are part of the report, never an error.
pub async fn probe_protocol(upstream: &dyn Upstream, slug: &str) -> InkResult<ProbeReport> {
    let endpoints = Endpoints::new(upstream.base_url())?;

    let mut revenue_urls = vec![endpoints.revenue_summary(slug)];
    revenue_urls.extend(
        REVENUE_DATA_TYPES
            .iter()
            .map(|dt| endpoints.fees_summary_data_type(slug, dt)),
    );

    let (fees, revenue) = futures::join!(
        probe(upstream, endpoints.fees_summary(slug)),
        futures::future::join_all(revenue_urls.into_iter().map(|url| probe(upstream, url)))
    );

    Ok(ProbeReport {
        ok: true,
        debug: slug.to_string(),
        fees,
        revenue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::StaticUpstream;
    use serde_json::json;

    #[tokio::test]
    async fn test_probe_collects_every_variant() {
        let up = StaticUpstream::new("https://api.llama.fi")
            .unwrap()
            .with_json("/summary/fees/foo", json!({"total24h": 1}))
            .with_json("/summary/fees/foo?dataType=revenue", json!({"total24h": 0.5}))
            .with_unreachable("/summary/revenue/foo");

        let report = probe_protocol(&up, "foo").await.unwrap();
        assert!(report.ok);
        assert_eq!(report.debug, "foo");
        assert_eq!(report.fees.json, Some(json!({"total24h": 1})));
        assert_eq!(report.revenue.len(), 4);

        assert_eq!(report.revenue[0].status, 0);
        assert!(report.revenue[0].error.is_some());
        assert!(report.revenue[1].ok);
        assert!(report.revenue[1].url.ends_with("dataType=revenue"));
        assert_eq!(report.revenue[2].status, 404);

        let body = serde_json::to_value(&report).unwrap();
        assert!(body["fees"].get("error").is_none());
        assert_eq!(body["revenue"][3]["url"], "https://api.llama.fi/summary/fees/foo?dataType=ProtocolRevenue");
    }
}
