//! Chain-wide TVL with a 24h change.

use serde_json::Value;
use tracing::{info, warn};

use inkdash_common::error::{InkError, InkResult};
use inkdash_common::traits::{Fetched, Upstream};
use inkdash_common::types::{ChainTvlSnapshot, SnapshotSource, TargetChain};

use crate::client::Endpoints;
use crate::json::{str_field, to_num};
use crate::pct::percent_change;

/// Array body of a response. A non-2xx answer is "no data"; a 2xx body
/// that is not an array is malformed.
fn array_body(fetched: Fetched) -> InkResult<Vec<Value>> {
    if !fetched.ok {
        warn!(url = %fetched.url, status = fetched.status, "snapshot source returned non-2xx");
        return Ok(Vec::new());
    }
    match fetched.json {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(InkError::MalformedPayload {
            url: fetched.url,
            message: "expected a JSON array".into(),
        }),
    }
}

/// Current TVL from the `/v2/chains` listing, matched on `name` first and
/// `chain` second.
pub fn chain_tvl(chains: &[Value], chain: &TargetChain) -> Option<f64> {
    chains
        .iter()
        .find(|c| chain.matches(&str_field(c, "name")))
        .or_else(|| chains.iter().find(|c| chain.matches(&str_field(c, "chain"))))
        .and_then(|c| c.get("tvl"))
        .and_then(to_num)
}

/// Change between the last two history points; unknown unless the
/// previous point is positive.
pub fn change_24h(history: &[Value]) -> Option<f64> {
    let [.., prev, last] = history else {
        return None;
    };
    let prev = prev.get("tvl").and_then(to_num).filter(|p| *p > 0.0)?;
    percent_change(last.get("tvl").and_then(to_num), Some(prev))
}

pub async fn build_snapshot(upstream: &dyn Upstream, chain: &TargetChain) -> InkResult<ChainTvlSnapshot> {
    let endpoints = Endpoints::new(upstream.base_url())?;
    let source = SnapshotSource {
        chains_url: endpoints.chains(),
        hist_url: endpoints.historical_chain_tvl(&chain.slug),
    };

    let (chains, history) = futures::join!(
        upstream.fetch(&source.chains_url),
        upstream.fetch(&source.hist_url)
    );
    let chains = array_body(chains?)?;
    let history = array_body(history?)?;

    let tvl = chain_tvl(&chains, chain);
    let tvl_change_24h_pct = change_24h(&history);
    info!(chain = %chain, ?tvl, ?tvl_change_24h_pct, "chain tvl snapshot");

    Ok(ChainTvlSnapshot {
        ok: true,
        chain: chain.name.clone(),
        tvl,
        tvl_change_24h_pct,
        source,
        ts: chrono::Utc::now().timestamp_millis(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::StaticUpstream;
    use serde_json::json;

    const BASE: &str = "https://api.llama.fi";

    fn history(tvls: &[f64]) -> Value {
        Value::Array(
            tvls.iter()
                .enumerate()
                .map(|(i, t)| json!({"date": i as i64 * 86_400, "tvl": t}))
                .collect(),
        )
    }

    #[test]
    fn test_chain_tvl_prefers_name() {
        let chains = vec![
            json!({"name": "Other", "chain": "ink", "tvl": 1}),
            json!({"name": "INK", "tvl": "2"}),
        ];
        assert_eq!(chain_tvl(&chains, &TargetChain::default()), Some(2.0));
        assert_eq!(chain_tvl(&chains[..1], &TargetChain::default()), Some(1.0));
        assert_eq!(chain_tvl(&[], &TargetChain::default()), None);
    }

    #[test]
    fn test_change_24h() {
        let h = history(&[50.0, 100.0, 110.0]);
        let change = change_24h(h.as_array().unwrap()).unwrap();
        assert!((change - 10.0).abs() < 1e-9);

        assert_eq!(change_24h(history(&[0.0, 5.0]).as_array().unwrap()), None);
        assert_eq!(change_24h(history(&[5.0]).as_array().unwrap()), None);
        assert_eq!(change_24h(&[]), None);
    }

    #[tokio::test]
    async fn test_build_snapshot() {
        let up = StaticUpstream::new(BASE)
            .unwrap()
            .with_json("/v2/chains", json!([{"name": "Base", "tvl": 9}, {"name": "Ink", "tvl": 500_000}]))
            .with_json("/v2/historicalChainTvl/ink", history(&[400_000.0, 500_000.0]));
        let snap = build_snapshot(&up, &TargetChain::default()).await.unwrap();
        assert!(snap.ok);
        assert_eq!(snap.chain, "Ink");
        assert_eq!(snap.tvl, Some(500_000.0));
        assert_eq!(snap.tvl_change_24h_pct, Some(25.0));
        assert_eq!(snap.source.hist_url, "https://api.llama.fi/v2/historicalChainTvl/ink");

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["source"]["chainsUrl"], "https://api.llama.fi/v2/chains");
        assert!(json.get("tvl_change_24h_pct").is_some());
    }

    #[tokio::test]
    async fn test_non_2xx_is_no_data() {
        let up = StaticUpstream::new(BASE)
            .unwrap()
            .with_status("/v2/chains", 503, "down")
            .with_json("/v2/historicalChainTvl/ink", history(&[1000.0, 1100.0]));
        let snap = build_snapshot(&up, &TargetChain::default()).await.unwrap();
        assert_eq!(snap.tvl, None);
        assert!(snap.tvl_change_24h_pct.is_some());
    }

    #[tokio::test]
    async fn test_transport_and_shape_failures() {
        let up = StaticUpstream::new(BASE)
            .unwrap()
            .with_unreachable("/v2/chains")
            .with_json("/v2/historicalChainTvl/ink", history(&[1.0]));
        assert!(matches!(
            build_snapshot(&up, &TargetChain::default()).await,
            Err(InkError::UpstreamUnreachable { .. })
        ));

        let up = StaticUpstream::new(BASE)
            .unwrap()
            .with_json("/v2/chains", json!({"not": "an array"}))
            .with_json("/v2/historicalChainTvl/ink", history(&[1.0]));
        assert!(matches!(
            build_snapshot(&up, &TargetChain::default()).await,
            Err(InkError::MalformedPayload { .. })
        ));
    }
}
