//! In-memory pool, reserve and token source backed by a JSON snapshot

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info, warn};

use super::traits::{PoolSource, ReserveReader, TokenRegistry};
use crate::domain::pool::{Pool, PoolDescriptor, PoolReserves};
use crate::shared::errors::{AppError, ReserveError};
use crate::shared::types::{PoolId, Token, TokenAddress, TokenMetadata};

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub pools: Vec<Pool>,
}

/// Serves pool listings, reserves and token metadata from memory.
///
/// Reserves can be replaced between requests to model a re-read; a read
/// always hands out a copy, so simulations never see a shared mutable pool.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    tokens: RwLock<BTreeMap<TokenAddress, TokenMetadata>>,
    pools: RwLock<BTreeMap<PoolId, Pool>>,
    unreadable: RwLock<BTreeSet<PoolId>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let store = Self::new();
        for token in snapshot.tokens {
            store.register_token(token);
        }
        for pool in snapshot.pools {
            store.insert_pool(pool);
        }
        store
    }

    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        let snapshot: Snapshot = serde_json::from_str(content)
            .map_err(|e| AppError::SnapshotError(format!("Malformed snapshot: {}", e)))?;
        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::SnapshotError(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        let store = Self::from_json_str(&content)?;
        info!(
            "📂 Loaded snapshot {}: {} tokens, {} pools",
            path.as_ref().display(),
            store.token_count(),
            store.pool_count()
        );
        Ok(store)
    }

    /// Register a token. Metadata is immutable once registered, so a later
    /// entry for the same address is ignored and `false` is returned.
    pub fn register_token(&self, token: Token) -> bool {
        let mut tokens = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
        if tokens.contains_key(&token.address) {
            warn!("⚠️ Duplicate token {} ({}) ignored", token.address, token.symbol);
            return false;
        }
        tokens.insert(
            token.address,
            TokenMetadata {
                symbol: token.symbol,
                decimals: token.decimals,
            },
        );
        true
    }

    pub fn insert_pool(&self, pool: Pool) {
        self.pools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pool.id.clone(), pool);
    }

    /// Replace a pool's reserves, as a fresh on-chain read would
    pub fn update_reserves(&self, pool_id: &PoolId, reserve_a: u128, reserve_b: u128) -> bool {
        let mut pools = self.pools.write().unwrap_or_else(PoisonError::into_inner);
        match pools.get_mut(pool_id) {
            Some(pool) => {
                pool.reserve_a = reserve_a;
                pool.reserve_b = reserve_b;
                true
            }
            None => false,
        }
    }

    /// Make reserve reads for a pool fail, as an unreachable endpoint would
    pub fn set_unreadable(&self, pool_id: &PoolId, unreadable: bool) {
        let mut set = self.unreadable.write().unwrap_or_else(PoisonError::into_inner);
        if unreadable {
            set.insert(pool_id.clone());
        } else {
            set.remove(pool_id);
        }
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(address, metadata)| Token::from_metadata(address.clone(), metadata.clone()))
            .collect()
    }

    pub fn pools(&self) -> Vec<Pool> {
        self.pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

#[async_trait]
impl PoolSource for SnapshotStore {
    async fn get_all_pools(&self) -> Result<Vec<PoolDescriptor>, ReserveError> {
        let pools = self.pools.read().unwrap_or_else(PoisonError::into_inner);
        Ok(pools
            .values()
            .map(|pool| PoolDescriptor {
                id: pool.id.clone(),
                token_a: pool.token_a.clone(),
                token_b: pool.token_b.clone(),
                fee_bps: pool.fee_bps,
            })
            .collect())
    }
}

#[async_trait]
impl ReserveReader for SnapshotStore {
    async fn get_reserves(&self, pool_id: &PoolId) -> Result<PoolReserves, ReserveError> {
        if self
            .unreadable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(pool_id)
        {
            return Err(ReserveError::Unavailable {
                pool: pool_id.clone(),
                reason: "reserve read failed".to_string(),
            });
        }

        let pools = self.pools.read().unwrap_or_else(PoisonError::into_inner);
        let pool = pools.get(pool_id).ok_or_else(|| ReserveError::Unavailable {
            pool: pool_id.clone(),
            reason: "unknown pool".to_string(),
        })?;
        debug!("Read reserves for {}: {} / {}", pool_id, pool.reserve_a, pool.reserve_b);

        Ok(PoolReserves {
            token_a: pool.token_a.clone(),
            token_b: pool.token_b.clone(),
            reserve_a: pool.reserve_a,
            reserve_b: pool.reserve_b,
        })
    }
}

impl TokenRegistry for SnapshotStore {
    fn get_token_metadata(&self, address: &TokenAddress) -> Option<TokenMetadata> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }
}
