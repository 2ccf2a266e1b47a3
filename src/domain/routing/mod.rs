//! Routing domain - path enumeration, integer swap simulation and ranking

mod path_finder;
mod route_simulator;
mod router;

pub use path_finder::PathFinder;
pub use route_simulator::{rank_routes, RouteSimulator};
pub use router::Router;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::pool::ExcludedPool;
use crate::shared::types::{PoolId, Ratio, TokenAddress};
use crate::shared::utils::min_amount_out;

/// A route request as handed to the router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub token_in: TokenAddress,
    pub token_out: TokenAddress,
    /// Smallest units of `token_in`
    pub amount_in: u128,
    pub max_hops: usize,
    pub bridge_tokens: Vec<TokenAddress>,
}

impl RouteRequest {
    pub fn new(token_in: impl Into<String>, token_out: impl Into<String>, amount_in: u128) -> Self {
        Self {
            token_in: TokenAddress::new(token_in),
            token_out: TokenAddress::new(token_out),
            amount_in,
            max_hops: 3,
            bridge_tokens: Vec::new(),
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_bridge_tokens<I, T>(mut self, bridge_tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.bridge_tokens = bridge_tokens
            .into_iter()
            .map(TokenAddress::new)
            .collect();
        self
    }
}

/// Loop-free sequence of pools from `token_in` to `token_out`.
///
/// `tokens` holds every token visited in order, so
/// `tokens.len() == pools.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteCandidate {
    pub pools: Vec<PoolId>,
    pub tokens: Vec<TokenAddress>,
}

impl RouteCandidate {
    pub fn hop_count(&self) -> usize {
        self.pools.len()
    }
}

/// One simulated hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopQuote {
    pub pool_id: PoolId,
    pub token_in: TokenAddress,
    pub token_out: TokenAddress,
    pub amount_in: u128,
    pub amount_out: u128,
    pub fee_bps: u32,
    /// Portion of `amount_in` kept by the pool
    pub fee_amount: u128,
    /// Input-side reserve before this hop
    pub reserve_in: u128,
    /// Output-side reserve before this hop
    pub reserve_out: u128,
    pub price_impact: Ratio,
    /// Fee-adjusted input over `reserve_in`
    pub depth_ratio: Ratio,
}

/// A candidate route with its predicted outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedRoute {
    pub token_in: TokenAddress,
    pub token_out: TokenAddress,
    pub amount_in: u128,
    pub amount_out: u128,
    pub hops: Vec<HopQuote>,
    /// Compounded fee rate across hops
    pub fee_rate: Ratio,
    /// Compounded price impact across hops
    pub price_impact: Ratio,
}

impl QuotedRoute {
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    pub fn pool_ids(&self) -> Vec<&PoolId> {
        self.hops.iter().map(|h| &h.pool_id).collect()
    }

    /// Tokens visited, in order
    pub fn path(&self) -> Vec<&TokenAddress> {
        let mut path = vec![&self.token_in];
        path.extend(self.hops.iter().map(|h| &h.token_out));
        path
    }

    /// The hop consuming the largest share of its pool; it dominates total impact
    pub fn most_constrained_hop(&self) -> Option<&HopQuote> {
        self.hops
            .iter()
            .reduce(|worst, hop| if hop.depth_ratio > worst.depth_ratio { hop } else { worst })
    }

    pub fn min_amount_out(&self, slippage_bps: u32) -> u128 {
        min_amount_out(self.amount_out, slippage_bps)
    }
}

/// Outcome of one route search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSearchResult {
    /// `None` is the normal "no route" outcome, not an error
    pub best: Option<QuotedRoute>,
    pub ranked: Vec<QuotedRoute>,
    pub excluded: Vec<ExcludedPool>,
    pub candidates_considered: usize,
    pub searched_at: DateTime<Utc>,
}

impl RouteSearchResult {
    pub fn empty() -> Self {
        Self {
            best: None,
            ranked: Vec::new(),
            excluded: Vec::new(),
            candidates_considered: 0,
            searched_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_none()
    }
}
