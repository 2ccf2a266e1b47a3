use std::collections::BTreeSet;

use super::RouteCandidate;
use crate::domain::pool::PoolGraph;
use crate::shared::types::{PoolId, TokenAddress};

/// Bounded-depth enumeration of simple paths through the pool graph.
///
/// The first intermediate token may be anything the graph reaches; every
/// later intermediate must be a bridge token. Liquidity concentrates in a
/// few hubs, so this keeps branching small without losing real routes.
pub struct PathFinder<'a> {
    graph: &'a PoolGraph,
    bridge_tokens: BTreeSet<&'a TokenAddress>,
    max_hops: usize,
}

impl<'a> PathFinder<'a> {
    pub fn new(graph: &'a PoolGraph, bridge_tokens: &'a [TokenAddress], max_hops: usize) -> Self {
        Self {
            graph,
            bridge_tokens: bridge_tokens.iter().collect(),
            max_hops,
        }
    }

    /// All simple paths from `token_in` to `token_out` of at most `max_hops` pools
    pub fn find_paths(&self, token_in: &TokenAddress, token_out: &TokenAddress) -> Vec<RouteCandidate> {
        let mut paths = Vec::new();
        if token_in == token_out || self.max_hops == 0 {
            return paths;
        }

        let mut tokens = vec![token_in.clone()];
        let mut pools = Vec::new();
        self.search(token_out, &mut tokens, &mut pools, &mut paths);
        paths
    }

    fn search(
        &self,
        target: &TokenAddress,
        tokens: &mut Vec<TokenAddress>,
        pools: &mut Vec<PoolId>,
        paths: &mut Vec<RouteCandidate>,
    ) {
        let Some(current) = tokens.last().cloned() else {
            return;
        };

        for pool in self.graph.edges_from(&current) {
            let Some(next) = pool.other_token(&current) else {
                continue;
            };

            if next == target {
                let mut path_tokens = tokens.clone();
                path_tokens.push(next.clone());
                let mut path_pools = pools.clone();
                path_pools.push(pool.id.clone());
                paths.push(RouteCandidate {
                    pools: path_pools,
                    tokens: path_tokens,
                });
                continue;
            }

            // Another hop must still fit after this one
            if pools.len() + 2 > self.max_hops {
                continue;
            }
            if tokens.contains(next) {
                continue;
            }
            let is_first_intermediate = tokens.len() == 1;
            if !is_first_intermediate && !self.bridge_tokens.contains(next) {
                continue;
            }

            tokens.push(next.clone());
            pools.push(pool.id.clone());
            self.search(target, tokens, pools, paths);
            pools.pop();
            tokens.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::Pool;

    fn pool(id: &str, a: &str, b: &str) -> Pool {
        Pool {
            id: PoolId::new(id),
            token_a: TokenAddress::new(a),
            token_b: TokenAddress::new(b),
            reserve_a: 1_000_000,
            reserve_b: 1_000_000,
            fee_bps: 30,
        }
    }

    fn addr(s: &str) -> TokenAddress {
        TokenAddress::new(s)
    }

    fn pool_ids(paths: &[RouteCandidate]) -> Vec<Vec<String>> {
        paths
            .iter()
            .map(|p| p.pools.iter().map(|id| id.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_finds_direct_and_two_hop_paths() {
        let graph = PoolGraph::build(vec![
            pool("A-B", "A", "B"),
            pool("B-C", "B", "C"),
            pool("A-C", "A", "C"),
        ]);
        let finder = PathFinder::new(&graph, &[], 3);
        let paths = finder.find_paths(&addr("A"), &addr("C"));

        assert_eq!(
            pool_ids(&paths),
            vec![vec!["A-B".to_string(), "B-C".to_string()], vec!["A-C".to_string()]]
        );
        for path in &paths {
            assert_eq!(path.tokens.len(), path.hop_count() + 1);
        }
    }

    #[test]
    fn test_max_hops_bounds_path_length() {
        let graph = PoolGraph::build(vec![pool("A-B", "A", "B"), pool("B-C", "B", "C")]);
        assert_eq!(PathFinder::new(&graph, &[], 2).find_paths(&addr("A"), &addr("C")).len(), 1);
        assert!(PathFinder::new(&graph, &[], 1).find_paths(&addr("A"), &addr("C")).is_empty());
    }

    #[test]
    fn test_second_intermediate_must_be_bridge() {
        // A -> X -> Y -> D, and A -> X -> HUB -> D
        let graph = PoolGraph::build(vec![
            pool("A-X", "A", "X"),
            pool("X-Y", "X", "Y"),
            pool("Y-D", "Y", "D"),
            pool("X-HUB", "X", "HUB"),
            pool("HUB-D", "HUB", "D"),
        ]);
        let bridges = vec![addr("HUB")];
        let paths = PathFinder::new(&graph, &bridges, 3).find_paths(&addr("A"), &addr("D"));

        assert_eq!(
            pool_ids(&paths),
            vec![vec!["A-X".to_string(), "X-HUB".to_string(), "HUB-D".to_string()]]
        );
    }

    #[test]
    fn test_paths_never_revisit_tokens() {
        let graph = PoolGraph::build(vec![
            pool("A-B", "A", "B"),
            pool("B-A2", "B", "A"),
            pool("B-C", "B", "C"),
            pool("A-C", "A", "C"),
        ]);
        let bridges = vec![addr("A"), addr("B"), addr("C")];
        let paths = PathFinder::new(&graph, &bridges, 4).find_paths(&addr("A"), &addr("C"));

        assert!(!paths.is_empty());
        for path in paths {
            let unique: BTreeSet<_> = path.tokens.iter().collect();
            assert_eq!(unique.len(), path.tokens.len(), "revisits a token: {:?}", path.tokens);
        }
    }

    #[test]
    fn test_parallel_pools_are_distinct_candidates() {
        let graph = PoolGraph::build(vec![pool("A-B#1", "A", "B"), pool("A-B#2", "A", "B")]);
        let paths = PathFinder::new(&graph, &[], 3).find_paths(&addr("A"), &addr("B"));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_unconnected_tokens_yield_nothing() {
        let graph = PoolGraph::build(vec![pool("A-B", "A", "B"), pool("C-D", "C", "D")]);
        assert!(PathFinder::new(&graph, &[], 3).find_paths(&addr("A"), &addr("D")).is_empty());
    }
}
