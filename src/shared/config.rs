//! Quoter configuration loaded from `Config.toml`

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::shared::errors::ConfigError;
use crate::shared::types::TokenAddress;

/// Route search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Maximum number of pools in a path
    pub max_hops: usize,
    /// High-liquidity hub tokens allowed as second and later intermediates
    pub bridge_tokens: Vec<TokenAddress>,
    /// Optional cap on the ranked candidate list; unbounded when unset
    pub max_candidates: Option<usize>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_hops: 3,
            bridge_tokens: Vec::new(),
            max_candidates: None,
        }
    }
}

/// Risk classification table. Depth thresholds are closed lower bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub medium_depth_bps: u32,
    pub high_depth_bps: u32,
    pub critical_depth_bps: u32,

    /// Margin over the computed price impact a tolerance must clear
    pub low_slippage_margin_bps: u32,
    pub medium_slippage_margin_bps: u32,
    pub high_slippage_margin_bps: u32,
    /// Tolerances above this are reported as front-running exposure
    pub max_reasonable_slippage_bps: u32,

    pub low_deadline_secs: u64,
    pub medium_deadline_secs: u64,
    pub high_deadline_secs: u64,
    pub critical_deadline_secs: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            medium_depth_bps: 100,
            high_depth_bps: 300,
            critical_depth_bps: 500,
            low_slippage_margin_bps: 10,
            medium_slippage_margin_bps: 50,
            high_slippage_margin_bps: 100,
            max_reasonable_slippage_bps: 500,
            low_deadline_secs: 30 * 60,
            medium_deadline_secs: 20 * 60,
            high_deadline_secs: 10 * 60,
            critical_deadline_secs: 5 * 60,
        }
    }
}

/// Quote worker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Extra quiet period before a request starts, letting bursts collapse
    pub debounce_ms: u64,
    pub channel_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 0,
            channel_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoterConfig {
    pub router: RouterConfig,
    pub risk: RiskConfig,
    pub worker: WorkerConfig,
}

impl QuoterConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.router.max_hops == 0 {
            return Err(ConfigError::Invalid("router.max_hops must be at least 1".to_string()));
        }
        if self.router.max_candidates == Some(0) {
            return Err(ConfigError::Invalid("router.max_candidates must be at least 1".to_string()));
        }

        let risk = &self.risk;
        if !(risk.medium_depth_bps < risk.high_depth_bps && risk.high_depth_bps < risk.critical_depth_bps) {
            return Err(ConfigError::Invalid(format!(
                "risk depth thresholds must be strictly increasing: {} / {} / {}",
                risk.medium_depth_bps, risk.high_depth_bps, risk.critical_depth_bps
            )));
        }
        if !(risk.low_deadline_secs >= risk.medium_deadline_secs
            && risk.medium_deadline_secs >= risk.high_deadline_secs
            && risk.high_deadline_secs >= risk.critical_deadline_secs)
        {
            return Err(ConfigError::Invalid(
                "deadlines must shrink as risk rises".to_string(),
            ));
        }
        if risk.critical_deadline_secs == 0 {
            return Err(ConfigError::Invalid("risk.critical_deadline_secs must be positive".to_string()));
        }
        if self.worker.channel_capacity == 0 {
            return Err(ConfigError::Invalid("worker.channel_capacity must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = QuoterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.router.max_hops, 3);
        assert_eq!(config.risk.low_deadline_secs, 1800);
        assert_eq!(config.risk.critical_deadline_secs, 300);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = QuoterConfig::from_toml_str(
            r#"
            [router]
            max_hops = 2
            bridge_tokens = ["WETH", "USDC"]

            [risk]
            critical_depth_bps = 800
            "#,
        )
        .unwrap();

        assert_eq!(config.router.max_hops, 2);
        assert_eq!(config.router.bridge_tokens.len(), 2);
        assert_eq!(config.router.max_candidates, None);
        assert_eq!(config.risk.critical_depth_bps, 800);
        assert_eq!(config.risk.medium_depth_bps, 100);
    }

    #[test]
    fn test_rejects_unordered_thresholds() {
        let result = QuoterConfig::from_toml_str(
            r#"
            [risk]
            medium_depth_bps = 400
            high_depth_bps = 300
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_candidate_cap_is_opt_in() {
        let config = QuoterConfig::from_toml_str("[router]\nmax_candidates = 5\n").unwrap();
        assert_eq!(config.router.max_candidates, Some(5));

        let result = QuoterConfig::from_toml_str("[router]\nmax_candidates = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_zero_hops() {
        let result = QuoterConfig::from_toml_str("[router]\nmax_hops = 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
