use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::{ExcludedPool, Pool};
use crate::shared::errors::ExclusionReason;
use crate::shared::types::{PoolId, TokenAddress};

/// Token graph for route search.
///
/// Ordered maps keep iteration order independent of insertion order, so the
/// same pool set always enumerates paths in the same sequence.
#[derive(Debug, Clone, Default)]
pub struct PoolGraph {
    pools: BTreeMap<PoolId, Pool>,
    adjacency: BTreeMap<TokenAddress, Vec<PoolId>>,
    excluded: Vec<ExcludedPool>,
}

impl PoolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from freshly read pools, skipping empty ones
    pub fn build<I: IntoIterator<Item = Pool>>(pools: I) -> Self {
        Self::build_with_exclusions(pools, Vec::new())
    }

    /// Build a graph, carrying forward pools already excluded upstream
    pub fn build_with_exclusions<I: IntoIterator<Item = Pool>>(
        pools: I,
        excluded: Vec<ExcludedPool>,
    ) -> Self {
        let mut graph = Self {
            excluded,
            ..Self::default()
        };
        for pool in pools {
            graph.add_pool(pool);
        }
        for edges in graph.adjacency.values_mut() {
            edges.sort();
        }

        debug!(
            "Built pool graph: {} tokens, {} pools, {} excluded",
            graph.token_count(),
            graph.pool_count(),
            graph.excluded.len()
        );
        graph
    }

    fn add_pool(&mut self, pool: Pool) {
        if pool.is_degenerate() {
            warn!("⚠️ Pool {} trades {} against itself, excluding", pool.id, pool.token_a);
            self.excluded.push(ExcludedPool {
                pool_id: pool.id,
                reason: ExclusionReason::DegeneratePair,
            });
            return;
        }
        if !pool.has_liquidity() {
            warn!(
                "⚠️ Pool {} has an empty reserve ({} / {}), excluding",
                pool.id, pool.reserve_a, pool.reserve_b
            );
            self.excluded.push(ExcludedPool {
                pool_id: pool.id,
                reason: ExclusionReason::EmptyReserve,
            });
            return;
        }
        if self.pools.contains_key(&pool.id) {
            warn!("⚠️ Duplicate pool {} ignored", pool.id);
            return;
        }

        self.adjacency
            .entry(pool.token_a.clone())
            .or_default()
            .push(pool.id.clone());
        self.adjacency
            .entry(pool.token_b.clone())
            .or_default()
            .push(pool.id.clone());
        self.pools.insert(pool.id.clone(), pool);
    }

    pub fn pool(&self, id: &PoolId) -> Option<&Pool> {
        self.pools.get(id)
    }

    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    /// Pools touching `token`, ordered by pool id
    pub fn edges_from<'a>(&'a self, token: &TokenAddress) -> impl Iterator<Item = &'a Pool> + 'a {
        self.adjacency
            .get(token)
            .into_iter()
            .flatten()
            .filter_map(|id| self.pools.get(id))
    }

    pub fn contains_token(&self, token: &TokenAddress) -> bool {
        self.adjacency.contains_key(token)
    }

    pub fn token_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn excluded(&self) -> &[ExcludedPool] {
        &self.excluded
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}
