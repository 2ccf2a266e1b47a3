//! End-to-end quote scenarios against the public API

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::timeout;

use swapquote::application::{QuoteOutcome, QuoteRequest, QuoteService, QuoteWorker};
use swapquote::domain::math::get_amount_out;
use swapquote::domain::pool::{Pool, PoolGraph, PoolReserves};
use swapquote::domain::risk::{RiskAnalyzer, RiskLevel};
use swapquote::domain::routing::{RouteRequest, Router};
use swapquote::infrastructure::{ReserveReader, SnapshotStore};
use swapquote::shared::config::{QuoterConfig, RiskConfig, RouterConfig, WorkerConfig};
use swapquote::shared::errors::{ExclusionReason, ReserveError};
use swapquote::shared::types::{PoolId, Ratio, Token, TokenAddress};

const WBTC: &str = "0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599";
const DAI: &str = "0x6B175474E89094C44Da98b954EedeAC495271d0F";

fn pool(id: &str, a: &str, b: &str, reserve_a: u128, reserve_b: u128) -> Pool {
    Pool {
        id: PoolId::new(id),
        token_a: TokenAddress::new(a),
        token_b: TokenAddress::new(b),
        reserve_a,
        reserve_b,
        fee_bps: 30,
    }
}

fn store(pools: Vec<Pool>) -> Arc<SnapshotStore> {
    let store = SnapshotStore::new();
    for token in ["A", "B", "C", "D"] {
        store.register_token(Token::new(token, token, 6));
    }
    for pool in pools {
        store.insert_pool(pool);
    }
    Arc::new(store)
}

fn service(store: Arc<SnapshotStore>) -> QuoteService {
    let router = Router::new(store.clone(), store.clone(), store);
    QuoteService::new(router, RiskAnalyzer::new(RiskConfig::default()), RouterConfig::default())
}

fn manifest_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[tokio::test]
async fn single_pool_scenario() {
    let service = service(store(vec![pool("A-B", "A", "B", 1_000_000, 1_000_000)]));
    let quote = service
        .quote(&QuoteRequest::new("A", "B", 10_000).with_slippage_bps(150))
        .await
        .unwrap();

    let best = quote.best().unwrap();
    // 9,970 after fee; 1e12 / 1,009,970 = 990,128.4 -> 1,000,000 - 990,128
    assert_eq!(best.amount_out, 9_872);
    assert!(best.price_impact > Ratio::from_bps(95) && best.price_impact < Ratio::from_bps(100));

    let risk = quote.risk.unwrap();
    assert_eq!(risk.risk_level, RiskLevel::Low);
    assert_eq!(risk.recommended_deadline_seconds, 1_800);
    assert!(quote.slippage.unwrap().is_valid);
}

#[tokio::test]
async fn two_hop_scenario_and_hop_limit() {
    let store = store(vec![
        pool("A-B", "A", "B", 1_000_000, 1_000_000),
        pool("B-C", "B", "C", 500_000, 1_200_000),
    ]);
    let router = Router::new(store.clone(), store.clone(), store);

    let result = router.find_best_route(&RouteRequest::new("A", "C", 20_000)).await.unwrap();
    let best = result.best.unwrap();
    assert_eq!(best.hop_count(), 2);
    assert_eq!(best.pool_ids(), vec![&PoolId::new("A-B"), &PoolId::new("B-C")]);

    let limited = router
        .find_best_route(&RouteRequest::new("A", "C", 20_000).with_max_hops(1))
        .await
        .unwrap();
    assert!(limited.best.is_none());
    assert!(limited.ranked.is_empty());
}

#[test]
fn single_hop_matches_closed_form_exactly() {
    let (reserve_in, reserve_out, fee) = (1_234_567u128, 7_654_321u128, 30u32);
    for amount_in in (1..=reserve_in).step_by(997) {
        let after_fee = amount_in * (10_000 - fee as u128) / 10_000;
        let expected = if after_fee == 0 {
            0
        } else {
            reserve_out - (reserve_in * reserve_out) / (reserve_in + after_fee)
        };
        assert_eq!(get_amount_out(amount_in, reserve_in, reserve_out, fee).unwrap(), expected);
    }
}

#[test]
fn search_is_deterministic_and_loop_free() {
    let pools = vec![
        pool("A-B", "A", "B", 1_000_000, 1_100_000),
        pool("A-C", "A", "C", 300_000, 310_000),
        pool("B-C", "B", "C", 800_000, 750_000),
        pool("B-D", "B", "D", 900_000, 950_000),
        pool("C-D", "C", "D", 600_000, 640_000),
        pool("A-D", "A", "D", 50_000, 52_000),
    ];
    let request = RouteRequest::new("A", "D", 25_000).with_bridge_tokens(["B", "C"]);
    let graph = PoolGraph::build(pools);

    let first = Router::search(&graph, &request, None);
    for _ in 0..5 {
        let again = Router::search(&graph, &request, None);
        assert_eq!(again.best, first.best);
        assert_eq!(again.ranked, first.ranked);
    }

    assert!(first.ranked.len() > 1);
    for route in &first.ranked {
        assert!(route.hops.iter().all(|hop| hop.amount_out > 0));
        let visited: BTreeSet<_> = route.path().into_iter().collect();
        assert_eq!(visited.len(), route.hop_count() + 1);
    }
    for pair in first.ranked.windows(2) {
        assert!(pair[0].amount_out >= pair[1].amount_out);
    }
}

#[test]
fn risk_brackets() {
    let analyzer = RiskAnalyzer::default();
    let pool = pool("A-B", "A", "B", 1_000_000_000, 1_000_000_000);
    let level = |amount_in: u128| {
        let out = get_amount_out(amount_in, 1_000_000_000, 1_000_000_000, 30).unwrap();
        analyzer
            .analyze_risk(&pool, &TokenAddress::new("A"), amount_in, out)
            .unwrap()
            .risk_level
    };

    assert_eq!(level(5_000_000), RiskLevel::Low);
    assert_eq!(level(20_000_000), RiskLevel::Medium);
    assert_eq!(level(40_000_000), RiskLevel::High);
    assert_eq!(level(60_000_000), RiskLevel::Critical);
}

#[tokio::test]
async fn snapshot_file_routes_through_bridge_and_skips_empty_pool() {
    let config = QuoterConfig::from_file(manifest_path("Config.toml")).unwrap();
    let store = Arc::new(SnapshotStore::from_json_file(manifest_path("data/pools.json")).unwrap());
    let router = Router::new(store.clone(), store.clone(), store);
    let service = QuoteService::new(router, RiskAnalyzer::new(config.risk.clone()), config.router.clone());

    let quote = service.quote(&QuoteRequest::new(WBTC, DAI, 50_000_000)).await.unwrap();
    let best = quote.best().unwrap();

    assert_eq!(best.token_in, TokenAddress::new(WBTC));
    assert_eq!(best.token_out, TokenAddress::new(DAI));
    assert!(best.hop_count() >= 2);
    assert!(quote
        .search
        .excluded
        .iter()
        .any(|e| e.pool_id == PoolId::new("UNI-DAI-30") && e.reason == ExclusionReason::EmptyReserve));
    assert_eq!(quote.risk.unwrap().risk_level, RiskLevel::Low);
}

/// Reserve reads stall while `slow` is set
struct SlowReader {
    inner: Arc<SnapshotStore>,
    slow: AtomicBool,
    entered: Notify,
}

#[async_trait]
impl ReserveReader for SlowReader {
    async fn get_reserves(&self, pool_id: &PoolId) -> Result<PoolReserves, ReserveError> {
        if self.slow.load(Ordering::SeqCst) {
            self.entered.notify_one();
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.inner.get_reserves(pool_id).await
    }
}

#[tokio::test]
async fn only_the_latest_request_is_applied() {
    let store = store(vec![pool("A-B", "A", "B", 1_000_000, 1_000_000)]);
    let reader = Arc::new(SlowReader {
        inner: store.clone(),
        slow: AtomicBool::new(true),
        entered: Notify::new(),
    });
    let router = Router::new(store.clone(), reader.clone(), store);
    let service = Arc::new(QuoteService::new(router, RiskAnalyzer::default(), RouterConfig::default()));
    let handle = QuoteWorker::spawn(service, &WorkerConfig::default());

    let first = handle.submit(QuoteRequest::new("A", "B", 10_000)).await.unwrap();
    assert!(handle.current().is_searching);
    timeout(Duration::from_secs(5), reader.entered.notified()).await.unwrap();

    reader.slow.store(false, Ordering::SeqCst);
    let second = handle.submit(QuoteRequest::new("A", "B", 30_000)).await.unwrap();
    let outcome = timeout(Duration::from_secs(5), handle.wait_for(second))
        .await
        .unwrap()
        .unwrap();

    match outcome {
        QuoteOutcome::Quoted(quote) => assert_eq!(quote.request.amount_in, 30_000),
        QuoteOutcome::Rejected(e) => panic!("unexpected rejection: {}", e),
    }
    assert!(handle.wait_for(first).await.is_none());
    assert_eq!(handle.current().generation, second);
    handle.shutdown().await.unwrap();
}
