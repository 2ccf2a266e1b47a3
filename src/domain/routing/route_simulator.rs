use std::cmp::Ordering;

use tracing::debug;

use super::{HopQuote, QuotedRoute, RouteCandidate};
use crate::domain::math::{amount_in_after_fee, depth_ratio, get_amount_out, hop_price_impact};
use crate::domain::pool::PoolGraph;
use crate::shared::errors::MathError;
use crate::shared::types::{PoolId, Ratio, TokenAddress};

/// Simulates candidates hop by hop against a read-only reserve snapshot
pub struct RouteSimulator<'a> {
    graph: &'a PoolGraph,
}

impl<'a> RouteSimulator<'a> {
    pub fn new(graph: &'a PoolGraph) -> Self {
        Self { graph }
    }

    /// Hop N's output becomes hop N+1's input. Any hop producing nothing
    /// invalidates the whole candidate.
    pub fn simulate(&self, candidate: &RouteCandidate, amount_in: u128) -> Result<QuotedRoute, MathError> {
        let (Some(token_in), Some(token_out)) = (candidate.tokens.first(), candidate.tokens.last()) else {
            return Err(MathError::ZeroInput);
        };

        let mut hops = Vec::with_capacity(candidate.hop_count());
        let mut amount = amount_in;

        for (index, pool_id) in candidate.pools.iter().enumerate() {
            let hop_in = &candidate.tokens[index];
            let hop_out = &candidate.tokens[index + 1];
            let pool = self.graph.pool(pool_id).ok_or(MathError::ZeroReserve)?;
            let (reserve_in, reserve_out) = pool.reserves_for(hop_in).ok_or(MathError::ZeroReserve)?;

            let hop = Self::simulate_hop(pool_id, hop_in, hop_out, amount, reserve_in, reserve_out, pool.fee_bps)?;
            amount = hop.amount_out;
            hops.push(hop);
        }

        let fee_rate = Ratio::compound(hops.iter().map(|h| Ratio::from_bps(h.fee_bps)));
        let price_impact = Ratio::compound(hops.iter().map(|h| h.price_impact));

        Ok(QuotedRoute {
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            amount_in,
            amount_out: amount,
            hops,
            fee_rate,
            price_impact,
        })
    }

    fn simulate_hop(
        pool_id: &PoolId,
        token_in: &TokenAddress,
        token_out: &TokenAddress,
        amount_in: u128,
        reserve_in: u128,
        reserve_out: u128,
        fee_bps: u32,
    ) -> Result<HopQuote, MathError> {
        let amount_out = get_amount_out(amount_in, reserve_in, reserve_out, fee_bps)?;
        if amount_out == 0 {
            return Err(MathError::ZeroOutput);
        }
        let after_fee = amount_in_after_fee(amount_in, fee_bps)?;

        Ok(HopQuote {
            pool_id: pool_id.clone(),
            token_in: token_in.clone(),
            token_out: token_out.clone(),
            amount_in,
            amount_out,
            fee_bps,
            fee_amount: amount_in - after_fee,
            reserve_in,
            reserve_out,
            price_impact: hop_price_impact(after_fee, amount_out, reserve_in, reserve_out)?,
            depth_ratio: depth_ratio(after_fee, reserve_in)?,
        })
    }

    /// Simulate every candidate, dropping the ones that fail
    pub fn simulate_all(&self, candidates: &[RouteCandidate], amount_in: u128) -> Vec<QuotedRoute> {
        candidates
            .iter()
            .filter_map(|candidate| match self.simulate(candidate, amount_in) {
                Ok(route) => Some(route),
                Err(e) => {
                    debug!("Discarding candidate {:?}: {}", candidate.pools, e);
                    None
                }
            })
            .collect()
    }
}

/// Best first: larger output, then fewer hops, then lower impact. The pool
/// id sequence settles anything left so ordering is fully deterministic.
fn compare_routes(a: &QuotedRoute, b: &QuotedRoute) -> Ordering {
    b.amount_out
        .cmp(&a.amount_out)
        .then_with(|| a.hop_count().cmp(&b.hop_count()))
        .then_with(|| a.price_impact.cmp(&b.price_impact))
        .then_with(|| a.pool_ids().cmp(&b.pool_ids()))
}

pub fn rank_routes(mut routes: Vec<QuotedRoute>) -> Vec<QuotedRoute> {
    routes.retain(|r| r.amount_out > 0 && r.hops.iter().all(|h| h.amount_out > 0));
    routes.sort_by(compare_routes);
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pool::Pool;
    use crate::domain::routing::PathFinder;

    fn pool(id: &str, a: &str, b: &str, reserve_a: u128, reserve_b: u128, fee_bps: u32) -> Pool {
        Pool {
            id: PoolId::new(id),
            token_a: TokenAddress::new(a),
            token_b: TokenAddress::new(b),
            reserve_a,
            reserve_b,
            fee_bps,
        }
    }

    fn candidate(pools: &[&str], tokens: &[&str]) -> RouteCandidate {
        RouteCandidate {
            pools: pools.iter().map(|p| PoolId::new(*p)).collect(),
            tokens: tokens.iter().map(|t| TokenAddress::new(*t)).collect(),
        }
    }

    #[test]
    fn test_single_hop_scenario() {
        let graph = PoolGraph::build(vec![pool("A-B", "A", "B", 1_000_000, 1_000_000, 30)]);
        let route = RouteSimulator::new(&graph)
            .simulate(&candidate(&["A-B"], &["A", "B"]), 10_000)
            .unwrap();

        assert_eq!(route.amount_out, 9_872);
        assert_eq!(route.hops[0].fee_amount, 30);
        assert_eq!(route.fee_rate, Ratio::from_bps(30));
        assert_eq!(route.hops[0].depth_ratio, Ratio::from_raw(9_970_000));
        assert!(route.price_impact > Ratio::from_bps(95) && route.price_impact < Ratio::from_bps(100));
    }

    #[test]
    fn test_output_below_infinite_liquidity_output() {
        let graph = PoolGraph::build(vec![pool("A-B", "A", "B", 800_000, 1_600_000, 30)]);
        let simulator = RouteSimulator::new(&graph);
        for amount_in in [1_000u128, 10_000, 100_000, 800_000] {
            let route = simulator.simulate(&candidate(&["A-B"], &["A", "B"]), amount_in).unwrap();
            assert!(route.amount_out < amount_in * 2, "amount_in = {}", amount_in);
        }
    }

    #[test]
    fn test_two_hop_chains_outputs() {
        let graph = PoolGraph::build(vec![
            pool("A-B", "A", "B", 1_000_000, 1_000_000, 30),
            pool("B-C", "B", "C", 500_000, 1_200_000, 30),
        ]);
        let route = RouteSimulator::new(&graph)
            .simulate(&candidate(&["A-B", "B-C"], &["A", "B", "C"]), 20_000)
            .unwrap();

        assert_eq!(route.hops[1].amount_in, route.hops[0].amount_out);
        assert_eq!(route.amount_out, route.hops[1].amount_out);
        assert_eq!(route.hops[0].amount_out, get_amount_out(20_000, 1_000_000, 1_000_000, 30).unwrap());
        assert_eq!(
            route.amount_out,
            get_amount_out(route.hops[0].amount_out, 500_000, 1_200_000, 30).unwrap()
        );
        // Compounded, not summed
        let summed = route.hops[0].price_impact.raw() + route.hops[1].price_impact.raw();
        assert!(route.price_impact.raw() < summed);
        assert_eq!(route.fee_rate, Ratio::compound([Ratio::from_bps(30), Ratio::from_bps(30)]));
    }

    #[test]
    fn test_zero_output_hop_is_discarded() {
        // 1 * 9970 / 10000 truncates to a zero fee-adjusted input
        let graph = PoolGraph::build(vec![pool("A-B", "A", "B", 1_000_000, 1_000_000, 30)]);
        let simulator = RouteSimulator::new(&graph);
        let result = simulator.simulate(&candidate(&["A-B"], &["A", "B"]), 1);
        assert_eq!(result, Err(MathError::ZeroOutput));
        assert!(simulator.simulate_all(&[candidate(&["A-B"], &["A", "B"])], 1).is_empty());
    }

    #[test]
    fn test_ranking_prefers_output_then_hops() {
        let graph = PoolGraph::build(vec![
            pool("A-C", "A", "C", 1_000_000, 1_000_000, 30),
            pool("A-B", "A", "B", 1_000_000, 1_000_000, 30),
            pool("B-C", "B", "C", 1_000_000, 1_000_000, 30),
        ]);
        let candidates = PathFinder::new(&graph, &[], 3).find_paths(&TokenAddress::new("A"), &TokenAddress::new("C"));
        let ranked = rank_routes(RouteSimulator::new(&graph).simulate_all(&candidates, 10_000));

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].hop_count(), 1);
        assert!(ranked[0].amount_out > ranked[1].amount_out);
    }

    #[test]
    fn test_ranking_tie_breaks_on_hops_then_impact() {
        let direct = QuotedRoute {
            token_in: TokenAddress::new("A"),
            token_out: TokenAddress::new("C"),
            amount_in: 100,
            amount_out: 90,
            hops: vec![hop("p-direct", Ratio::from_bps(50))],
            fee_rate: Ratio::from_bps(30),
            price_impact: Ratio::from_bps(50),
        };
        let mut two_hop = direct.clone();
        two_hop.hops = vec![hop("p1", Ratio::from_bps(5)), hop("p2", Ratio::from_bps(5))];
        two_hop.price_impact = Ratio::from_bps(10);
        let mut low_impact = direct.clone();
        low_impact.hops = vec![hop("p-other", Ratio::from_bps(20))];
        low_impact.price_impact = Ratio::from_bps(20);

        let ranked = rank_routes(vec![two_hop, direct, low_impact]);
        let ids: Vec<String> = ranked.iter().map(|r| r.hops[0].pool_id.to_string()).collect();
        assert_eq!(ids, vec!["p-other", "p-direct", "p1"]);
    }

    fn hop(id: &str, impact: Ratio) -> HopQuote {
        HopQuote {
            pool_id: PoolId::new(id),
            token_in: TokenAddress::new("A"),
            token_out: TokenAddress::new("C"),
            amount_in: 100,
            amount_out: 90,
            fee_bps: 30,
            fee_amount: 0,
            reserve_in: 1_000,
            reserve_out: 1_000,
            price_impact: impact,
            depth_ratio: Ratio::from_bps(1_000),
        }
    }
}
