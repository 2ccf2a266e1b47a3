//! Risk domain - depth-based risk classification, slippage validation and
//! deadline policy

mod risk_analyzer;

pub use risk_analyzer::RiskAnalyzer;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::types::{PoolId, Ratio};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution risk of one (route, amount) pair. Recomputed per quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    /// Trade size over the input reserve of the most constrained pool
    pub depth_ratio: Ratio,
    pub price_impact: Ratio,
    /// The pool the assessment was scored against
    pub pool_id: PoolId,
    /// Whether any tolerance can cover this trade. Narrowed to the user's
    /// own tolerance once a [`SlippageVerdict`] is applied.
    pub is_slippage_sufficient: bool,
    pub message: String,
    pub recommended_deadline_seconds: u64,
}

impl RiskAssessment {
    pub fn with_slippage_verdict(mut self, verdict: &SlippageVerdict) -> Self {
        self.is_slippage_sufficient = verdict.is_valid;
        self
    }
}

/// Adequacy of the user's configured tolerance. Advisory: the tolerance
/// itself is never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlippageVerdict {
    pub is_valid: bool,
    /// Smallest tolerance that would pass, when one exists
    pub required_bps: Option<u64>,
    pub message: String,
}
