//! Error handling for the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::types::{PoolId, TokenAddress};

/// Quote request rejected before any search is attempted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Token in and token out are identical: {0}")]
    IdenticalTokens(TokenAddress),

    #[error("Token not registered: {0}")]
    UnknownToken(TokenAddress),

    #[error("Max hops must be at least 1")]
    InvalidMaxHops,
}

/// Reserve reader / pool source failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReserveError {
    #[error("Reserves unavailable for pool {pool}: {reason}")]
    Unavailable { pool: PoolId, reason: String },

    #[error("Pool {0} reported tokens that do not match its descriptor")]
    TokenMismatch(PoolId),

    #[error("Pool listing failed: {0}")]
    ListingFailed(String),
}

/// Integer AMM arithmetic failures. A candidate hitting one is discarded.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    #[error("Pool reserve is zero")]
    ZeroReserve,

    #[error("Input amount is zero")]
    ZeroInput,

    #[error("Fee of {0} bps is out of range")]
    InvalidFee(u32),

    #[error("Swap produces no output")]
    ZeroOutput,

    #[error("Arithmetic overflow")]
    Overflow,
}

/// Risk analysis failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("Token {token} is not traded by pool {pool}")]
    TokenNotInPool { pool: PoolId, token: TokenAddress },

    #[error(transparent)]
    Math(#[from] MathError),
}

/// Why a pool was left out of the graph for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionReason {
    /// Reserves could not be read (partial data degradation)
    ReservesUnreadable(String),
    /// One side of the pool is empty (data-quality signal)
    EmptyReserve,
    /// Both sides name the same token
    DegeneratePair,
}

/// Configuration loading / validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Snapshot error: {0}")]
    SnapshotError(String),

    #[error("Quote error: {0}")]
    QuoteError(#[from] QuoteError),

    #[error("Report error: {0}")]
    ReportError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Quote worker stopped")]
    WorkerStopped,
}

impl From<ReserveError> for AppError {
    fn from(err: ReserveError) -> Self {
        AppError::SnapshotError(err.to_string())
    }
}

