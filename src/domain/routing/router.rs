//! Route search over freshly read reserves

use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{rank_routes, PathFinder, RouteRequest, RouteSearchResult, RouteSimulator};
use crate::domain::pool::{ExcludedPool, Pool, PoolGraph};
use crate::infrastructure::sources::{PoolSource, ReserveReader, TokenRegistry};
use crate::shared::errors::{ExclusionReason, QuoteError};

/// Finds the best route between two tokens.
///
/// The only suspension point is the reserve fetch; the search itself is a
/// pure function of the reserve snapshot and the request.
pub struct Router {
    pool_source: Arc<dyn PoolSource>,
    reserve_reader: Arc<dyn ReserveReader>,
    token_registry: Arc<dyn TokenRegistry>,
    max_candidates: Option<usize>,
}

impl Router {
    pub fn new(
        pool_source: Arc<dyn PoolSource>,
        reserve_reader: Arc<dyn ReserveReader>,
        token_registry: Arc<dyn TokenRegistry>,
    ) -> Self {
        Self {
            pool_source,
            reserve_reader,
            token_registry,
            max_candidates: None,
        }
    }

    /// Cap the ranked list handed back to callers
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = Some(max_candidates.max(1));
        self
    }

    pub fn token_registry(&self) -> &Arc<dyn TokenRegistry> {
        &self.token_registry
    }

    /// Reject malformed requests before any I/O
    pub fn validate(&self, request: &RouteRequest) -> Result<(), QuoteError> {
        if request.token_in == request.token_out {
            return Err(QuoteError::IdenticalTokens(request.token_in.clone()));
        }
        for token in [&request.token_in, &request.token_out] {
            if !self.token_registry.is_registered(token) {
                return Err(QuoteError::UnknownToken(token.clone()));
            }
        }
        if request.max_hops == 0 {
            return Err(QuoteError::InvalidMaxHops);
        }
        Ok(())
    }

    /// `findBestRoute`: validate, read reserves, search.
    ///
    /// A zero amount or an unconnected pair is a normal empty result.
    pub async fn find_best_route(&self, request: &RouteRequest) -> Result<RouteSearchResult, QuoteError> {
        self.validate(request)?;

        if request.amount_in == 0 {
            debug!("Zero amount in, skipping search");
            return Ok(RouteSearchResult::empty());
        }

        info!(
            "🔍 Searching routes {} -> {} for {} (max hops {})",
            request.token_in, request.token_out, request.amount_in, request.max_hops
        );

        let graph = self.load_graph().await;
        let result = Self::search(&graph, request, self.max_candidates);

        match &result.best {
            Some(best) => info!(
                "🎯 Best route: {} hop(s), amount out {}, impact {} ({} candidates)",
                best.hop_count(),
                best.amount_out,
                best.price_impact,
                result.ranked.len()
            ),
            None => info!("No route found {} -> {}", request.token_in, request.token_out),
        }
        Ok(result)
    }

    /// Read the pool list and every pool's reserves into a fresh snapshot.
    ///
    /// Unreadable or empty pools are excluded for this request only.
    pub async fn load_graph(&self) -> PoolGraph {
        let descriptors = match self.pool_source.get_all_pools().await {
            Ok(descriptors) => descriptors,
            Err(e) => {
                warn!("⚠️ Pool listing failed, searching an empty graph: {}", e);
                Vec::new()
            }
        };

        let reads = descriptors.iter().map(|d| self.reserve_reader.get_reserves(&d.id));
        let reserves = join_all(reads).await;

        let mut pools: Vec<Pool> = Vec::with_capacity(descriptors.len());
        let mut excluded = Vec::new();
        for (descriptor, reserves) in descriptors.into_iter().zip(reserves) {
            let pool_id = descriptor.id.clone();
            match reserves.and_then(|r| Pool::from_parts(descriptor, r)) {
                Ok(pool) => pools.push(pool),
                Err(e) => {
                    warn!("⚠️ Excluding pool {}: {}", pool_id, e);
                    excluded.push(ExcludedPool {
                        pool_id,
                        reason: ExclusionReason::ReservesUnreadable(e.to_string()),
                    });
                }
            }
        }

        PoolGraph::build_with_exclusions(pools, excluded)
    }

    /// Synchronous search over an already-built graph. The ranked list is
    /// complete unless `max_candidates` caps it.
    pub fn search(graph: &PoolGraph, request: &RouteRequest, max_candidates: Option<usize>) -> RouteSearchResult {
        let mut result = RouteSearchResult::empty();
        result.excluded = graph.excluded().to_vec();

        if request.amount_in == 0 || request.token_in == request.token_out {
            return result;
        }

        let finder = PathFinder::new(graph, &request.bridge_tokens, request.max_hops);
        let candidates = finder.find_paths(&request.token_in, &request.token_out);
        result.candidates_considered = candidates.len();
        debug!("Enumerated {} candidate paths", candidates.len());

        let mut ranked = rank_routes(RouteSimulator::new(graph).simulate_all(&candidates, request.amount_in));
        if let Some(cap) = max_candidates {
            ranked.truncate(cap);
        }

        result.best = ranked.first().cloned();
        result.ranked = ranked;
        result.searched_at = Utc::now();
        result
    }
}
