//! Common types used across the application

use serde::{Deserialize, Serialize};
use std::fmt;

/// Token address, the unique token identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenAddress(String);

impl TokenAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Pool identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(String);

impl PoolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoolId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Symbol and decimals as returned by the token registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub symbol: String,
    pub decimals: u8,
}

/// Token representation. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: TokenAddress,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: TokenAddress::new(address),
            symbol: symbol.into(),
            decimals,
        }
    }

    pub fn from_metadata(address: TokenAddress, metadata: TokenMetadata) -> Self {
        Self {
            address,
            symbol: metadata.symbol,
            decimals: metadata.decimals,
        }
    }
}

/// Basis points denominator (100% = 10_000 bps)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Fixed-point ratio scaled by [`Ratio::SCALE`].
///
/// Used for price impact, depth ratio and compounded fee rates so that
/// nothing influencing route ranking goes through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ratio(u64);

impl Ratio {
    pub const SCALE: u64 = 1_000_000_000;
    pub const ZERO: Ratio = Ratio(0);
    pub const ONE: Ratio = Ratio(Self::SCALE);

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Exact basis-point ratio (`100` bps = 1%)
    pub const fn from_bps(bps: u32) -> Self {
        Self(bps as u64 * (Self::SCALE / BPS_DENOMINATOR as u64))
    }

    /// Basis points, truncated
    pub fn to_bps_floor(&self) -> u64 {
        self.0 / (Self::SCALE / BPS_DENOMINATOR as u64)
    }

    /// Basis points, rounded up
    pub fn to_bps_ceil(&self) -> u64 {
        let unit = Self::SCALE / BPS_DENOMINATOR as u64;
        self.0.div_ceil(unit)
    }

    /// `1 - self`, saturating at zero
    pub fn complement(&self) -> Ratio {
        Ratio(Self::SCALE.saturating_sub(self.0))
    }

    /// Fixed-point product, truncated
    pub fn mul(&self, other: Ratio) -> Ratio {
        let product = self.0 as u128 * other.0 as u128 / Self::SCALE as u128;
        Ratio(product as u64)
    }

    /// Compound independent losses multiplicatively: `1 - Π(1 - r_i)`
    pub fn compound<I: IntoIterator<Item = Ratio>>(ratios: I) -> Ratio {
        ratios
            .into_iter()
            .fold(Ratio::ONE, |retained, r| retained.mul(r.complement()))
            .complement()
    }

    /// Presentation only. Never feed back into route math.
    pub fn as_percent(&self) -> f64 {
        self.0 as f64 / Self::SCALE as f64 * 100.0
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}%", self.as_percent())
    }
}
