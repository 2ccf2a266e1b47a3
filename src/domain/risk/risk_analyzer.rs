use tracing::debug;

use super::{RiskAssessment, RiskLevel, SlippageVerdict};
use crate::domain::math::{amount_in_after_fee, depth_ratio, hop_price_impact};
use crate::domain::pool::Pool;
use crate::domain::routing::QuotedRoute;
use crate::shared::config::RiskConfig;
use crate::shared::errors::{MathError, RiskError};
use crate::shared::types::{PoolId, Ratio, TokenAddress};

/// Stateless risk scoring. Identical inputs always give identical output;
/// the classification table is the only state.
#[derive(Debug, Clone, Default)]
pub struct RiskAnalyzer {
    config: RiskConfig,
}

impl RiskAnalyzer {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Closed lower bound per bracket: exactly 1% is already medium
    pub fn classify(&self, depth_ratio: Ratio) -> RiskLevel {
        if depth_ratio >= Ratio::from_bps(self.config.critical_depth_bps) {
            RiskLevel::Critical
        } else if depth_ratio >= Ratio::from_bps(self.config.high_depth_bps) {
            RiskLevel::High
        } else if depth_ratio >= Ratio::from_bps(self.config.medium_depth_bps) {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// `analyzeRisk` for a single pool swap selling `token_in`
    pub fn analyze_risk(
        &self,
        pool: &Pool,
        token_in: &TokenAddress,
        amount_in: u128,
        amount_out: u128,
    ) -> Result<RiskAssessment, RiskError> {
        let (reserve_in, reserve_out) = pool.reserves_for(token_in).ok_or_else(|| RiskError::TokenNotInPool {
            pool: pool.id.clone(),
            token: token_in.clone(),
        })?;
        if amount_in == 0 {
            return Err(MathError::ZeroInput.into());
        }

        let after_fee = amount_in_after_fee(amount_in, pool.fee_bps)?;
        let ratio = depth_ratio(after_fee, reserve_in)?;
        let impact = if after_fee == 0 {
            Ratio::ONE
        } else {
            hop_price_impact(after_fee, amount_out, reserve_in, reserve_out)?
        };

        Ok(self.build_assessment(pool.id.clone(), ratio, impact))
    }

    /// Score a route against its most liquidity-constrained hop, carrying the
    /// route's compounded impact
    pub fn assess_route(&self, route: &QuotedRoute) -> Option<RiskAssessment> {
        let hop = route.most_constrained_hop()?;
        Some(self.build_assessment(hop.pool_id.clone(), hop.depth_ratio, route.price_impact))
    }

    fn build_assessment(&self, pool_id: PoolId, depth_ratio: Ratio, price_impact: Ratio) -> RiskAssessment {
        let risk_level = self.classify(depth_ratio);
        let message = match risk_level {
            RiskLevel::Low => format!(
                "Trade uses {} of pool {} liquidity; price impact {}",
                depth_ratio, pool_id, price_impact
            ),
            RiskLevel::Medium => format!(
                "Trade uses {} of pool {} liquidity; expect noticeable price impact ({})",
                depth_ratio, pool_id, price_impact
            ),
            RiskLevel::High => format!(
                "Trade uses {} of pool {} liquidity; high price impact ({}) and front-running exposure",
                depth_ratio, pool_id, price_impact
            ),
            RiskLevel::Critical => format!(
                "Trade uses {} of pool {} liquidity; split or reduce the trade size",
                depth_ratio, pool_id
            ),
        };
        debug!("Risk {} for pool {} (depth {})", risk_level, pool_id, depth_ratio);

        RiskAssessment {
            risk_level,
            depth_ratio,
            price_impact,
            pool_id,
            is_slippage_sufficient: risk_level != RiskLevel::Critical,
            message,
            recommended_deadline_seconds: self.recommended_deadline(risk_level),
        }
    }

    fn slippage_margin_bps(&self, level: RiskLevel) -> Option<u32> {
        match level {
            RiskLevel::Low => Some(self.config.low_slippage_margin_bps),
            RiskLevel::Medium => Some(self.config.medium_slippage_margin_bps),
            RiskLevel::High => Some(self.config.high_slippage_margin_bps),
            RiskLevel::Critical => None,
        }
    }

    /// `validateSlippage`: report whether the configured tolerance covers the
    /// worst-case adverse movement implied by the assessment
    pub fn validate_slippage(&self, user_slippage_bps: u32, assessment: &RiskAssessment) -> SlippageVerdict {
        let user = Ratio::from_bps(user_slippage_bps);

        let Some(margin_bps) = self.slippage_margin_bps(assessment.risk_level) else {
            return SlippageVerdict {
                is_valid: false,
                required_bps: None,
                message: format!(
                    "Trade uses {} of pool depth; no slippage tolerance is safe at this size, reduce the trade",
                    assessment.depth_ratio
                ),
            };
        };

        let required_bps = assessment.price_impact.to_bps_ceil() + margin_bps as u64;
        if (user_slippage_bps as u64) < required_bps {
            return SlippageVerdict {
                is_valid: false,
                required_bps: Some(required_bps),
                message: format!(
                    "Slippage tolerance {} is below the {} this {} risk trade needs",
                    user,
                    Ratio::from_raw(required_bps * (Ratio::SCALE / 10_000)),
                    assessment.risk_level
                ),
            };
        }

        let message = if user_slippage_bps > self.config.max_reasonable_slippage_bps {
            format!(
                "Slippage tolerance {} covers the price impact {} but widens the front-running window",
                user, assessment.price_impact
            )
        } else {
            format!(
                "Slippage tolerance {} covers the price impact {}",
                user, assessment.price_impact
            )
        };
        SlippageVerdict {
            is_valid: true,
            required_bps: Some(required_bps),
            message,
        }
    }

    /// `recommendedDeadline`: advisory execution window, shrinking as risk rises
    pub fn recommended_deadline(&self, level: RiskLevel) -> u64 {
        match level {
            RiskLevel::Low => self.config.low_deadline_secs,
            RiskLevel::Medium => self.config.medium_deadline_secs,
            RiskLevel::High => self.config.high_deadline_secs,
            RiskLevel::Critical => self.config.critical_deadline_secs,
        }
    }
}
