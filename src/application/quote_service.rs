//! Quote use case: route search followed by risk scoring

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::risk::{RiskAnalyzer, RiskAssessment, SlippageVerdict};
use crate::domain::routing::{QuotedRoute, RouteRequest, RouteSearchResult, Router};
use crate::infrastructure::sources::TokenRegistry;
use crate::shared::config::RouterConfig;
use crate::shared::errors::QuoteError;
use crate::shared::types::TokenAddress;

/// What a user asks for: sell `amount_in` of `token_in` for `token_out`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub token_in: TokenAddress,
    pub token_out: TokenAddress,
    pub amount_in: u128,
    pub slippage_bps: u32,
    /// Falls back to the configured router default
    pub max_hops: Option<usize>,
}

impl QuoteRequest {
    pub fn new(token_in: impl Into<String>, token_out: impl Into<String>, amount_in: u128) -> Self {
        Self {
            token_in: TokenAddress::new(token_in),
            token_out: TokenAddress::new(token_out),
            amount_in,
            slippage_bps: 50,
            max_hops: None,
        }
    }

    pub fn with_slippage_bps(mut self, slippage_bps: u32) -> Self {
        self.slippage_bps = slippage_bps;
        self
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = Some(max_hops);
        self
    }
}

/// A complete quote. Every risk field is `None` when no route exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub request: QuoteRequest,
    pub search: RouteSearchResult,
    pub risk: Option<RiskAssessment>,
    pub slippage: Option<SlippageVerdict>,
    /// Minimum received at the requested tolerance
    pub min_amount_out: Option<u128>,
    pub deadline_secs: Option<u64>,
    pub quoted_at: DateTime<Utc>,
}

impl Quote {
    pub fn best(&self) -> Option<&QuotedRoute> {
        self.search.best.as_ref()
    }

    pub fn is_executable(&self) -> bool {
        self.best().is_some() && self.slippage.as_ref().is_some_and(|v| v.is_valid)
    }
}

pub struct QuoteService {
    router: Router,
    analyzer: RiskAnalyzer,
    config: RouterConfig,
}

impl QuoteService {
    pub fn new(router: Router, analyzer: RiskAnalyzer, config: RouterConfig) -> Self {
        let router = match config.max_candidates {
            Some(cap) => router.with_max_candidates(cap),
            None => router,
        };
        Self {
            router,
            analyzer,
            config,
        }
    }

    pub fn token_registry(&self) -> &Arc<dyn TokenRegistry> {
        self.router.token_registry()
    }

    pub fn route_request(&self, request: &QuoteRequest) -> RouteRequest {
        RouteRequest {
            token_in: request.token_in.clone(),
            token_out: request.token_out.clone(),
            amount_in: request.amount_in,
            max_hops: request.max_hops.unwrap_or(self.config.max_hops),
            bridge_tokens: self.config.bridge_tokens.clone(),
        }
    }

    pub async fn quote(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        let search = self.router.find_best_route(&self.route_request(request)).await?;

        let assessment = search.best.as_ref().and_then(|route| self.analyzer.assess_route(route));
        let slippage = assessment
            .as_ref()
            .map(|a| self.analyzer.validate_slippage(request.slippage_bps, a));
        let risk = match (assessment, &slippage) {
            (Some(assessment), Some(verdict)) => Some(assessment.with_slippage_verdict(verdict)),
            (assessment, _) => assessment,
        };

        if let Some(risk) = &risk {
            info!("📊 Risk {}: {}", risk.risk_level, risk.message);
        }
        if let Some(verdict) = slippage.as_ref().filter(|v| !v.is_valid) {
            warn!("⚠️ {}", verdict.message);
        }

        Ok(Quote {
            request: request.clone(),
            min_amount_out: search.best.as_ref().map(|r| r.min_amount_out(request.slippage_bps)),
            deadline_secs: risk.as_ref().map(|r| r.recommended_deadline_seconds),
            risk,
            slippage,
            search,
            quoted_at: Utc::now(),
        })
    }
}
