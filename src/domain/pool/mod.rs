//! Pool domain - liquidity pools and the token graph built from them

mod pool_graph;

pub use pool_graph::PoolGraph;

use serde::{Deserialize, Serialize};

use crate::shared::errors::{ExclusionReason, ReserveError};
use crate::shared::types::{PoolId, TokenAddress};

/// Static pool information as returned by pool discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolDescriptor {
    pub id: PoolId,
    pub token_a: TokenAddress,
    pub token_b: TokenAddress,
    pub fee_bps: u32,
}

/// Raw reserves as returned by the reserve reader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    pub token_a: TokenAddress,
    pub token_b: TokenAddress,
    pub reserve_a: u128,
    pub reserve_b: u128,
}

/// Graph edge: a pool with a freshly read reserve snapshot.
///
/// Reserves are only ever replaced by re-reading, never by local simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub token_a: TokenAddress,
    pub token_b: TokenAddress,
    pub reserve_a: u128,
    pub reserve_b: u128,
    pub fee_bps: u32,
}

/// A pool left out of the graph for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedPool {
    pub pool_id: PoolId,
    pub reason: ExclusionReason,
}

impl Pool {
    /// Join a descriptor with its reserves. The reader may report the pair
    /// in either order; reserves are aligned to the descriptor.
    pub fn from_parts(descriptor: PoolDescriptor, reserves: PoolReserves) -> Result<Self, ReserveError> {
        let (reserve_a, reserve_b) = if reserves.token_a == descriptor.token_a
            && reserves.token_b == descriptor.token_b
        {
            (reserves.reserve_a, reserves.reserve_b)
        } else if reserves.token_a == descriptor.token_b && reserves.token_b == descriptor.token_a {
            (reserves.reserve_b, reserves.reserve_a)
        } else {
            return Err(ReserveError::TokenMismatch(descriptor.id));
        };

        Ok(Self {
            id: descriptor.id,
            token_a: descriptor.token_a,
            token_b: descriptor.token_b,
            reserve_a,
            reserve_b,
            fee_bps: descriptor.fee_bps,
        })
    }

    pub fn has_liquidity(&self) -> bool {
        self.reserve_a > 0 && self.reserve_b > 0
    }

    pub fn is_degenerate(&self) -> bool {
        self.token_a == self.token_b
    }

    /// Usable in routing only while both sides hold liquidity
    pub fn is_usable(&self) -> bool {
        self.has_liquidity() && !self.is_degenerate()
    }

    pub fn contains(&self, token: &TokenAddress) -> bool {
        &self.token_a == token || &self.token_b == token
    }

    /// The token on the other side of `token`
    pub fn other_token(&self, token: &TokenAddress) -> Option<&TokenAddress> {
        if &self.token_a == token {
            Some(&self.token_b)
        } else if &self.token_b == token {
            Some(&self.token_a)
        } else {
            None
        }
    }

    /// `(reserve_in, reserve_out)` for a swap selling `token_in`
    pub fn reserves_for(&self, token_in: &TokenAddress) -> Option<(u128, u128)> {
        if &self.token_a == token_in {
            Some((self.reserve_a, self.reserve_b))
        } else if &self.token_b == token_in {
            Some((self.reserve_b, self.reserve_a))
        } else {
            None
        }
    }
}
