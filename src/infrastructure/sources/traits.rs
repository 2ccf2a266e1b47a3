use async_trait::async_trait;

use crate::domain::pool::{PoolDescriptor, PoolReserves};
use crate::shared::errors::ReserveError;
use crate::shared::types::{PoolId, TokenAddress, TokenMetadata};

/// Pool discovery feed.
/// May return an empty or partial set; the router degrades to "no route".
#[async_trait]
pub trait PoolSource: Send + Sync {
    async fn get_all_pools(&self) -> Result<Vec<PoolDescriptor>, ReserveError>;
}

/// Reads raw integer reserves for one pool
#[async_trait]
pub trait ReserveReader: Send + Sync {
    async fn get_reserves(&self, pool_id: &PoolId) -> Result<PoolReserves, ReserveError>;
}

/// Address to symbol/decimals lookup
pub trait TokenRegistry: Send + Sync {
    fn get_token_metadata(&self, address: &TokenAddress) -> Option<TokenMetadata>;

    fn is_registered(&self, address: &TokenAddress) -> bool {
        self.get_token_metadata(address).is_some()
    }
}
