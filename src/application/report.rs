//! Presentation rendering of a quote: decimal amounts and percent strings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::quote_service::Quote;
use crate::domain::routing::{HopQuote, QuotedRoute};
use crate::infrastructure::sources::TokenRegistry;
use crate::shared::types::TokenAddress;
use crate::shared::utils::format_amount;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDetails {
    pub address: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenDetails {
    fn resolve(registry: &dyn TokenRegistry, address: &TokenAddress) -> Self {
        match registry.get_token_metadata(address) {
            Some(metadata) => Self {
                address: address.to_string(),
                symbol: metadata.symbol,
                decimals: metadata.decimals,
            },
            None => Self {
                address: address.to_string(),
                symbol: address.to_string(),
                decimals: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopDetails {
    pub pool_id: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub amount_out: String,
    pub fee_bps: u32,
    pub fee_amount: String,
    pub price_impact: String,
    pub depth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDetails {
    pub path: Vec<String>,
    pub amount_out: String,
    pub fee_rate: String,
    pub price_impact: String,
    pub hops: Vec<HopDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskDetails {
    pub risk_level: String,
    pub depth_ratio: String,
    pub pool_id: String,
    pub message: String,
    pub slippage_bps: u32,
    pub slippage_valid: bool,
    pub required_slippage_bps: Option<u64>,
    pub slippage_message: String,
    pub min_amount_out: String,
    pub deadline_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteReport {
    pub token_in: TokenDetails,
    pub token_out: TokenDetails,
    pub amount_in: String,
    /// `None` when no route connects the pair
    pub best: Option<RouteDetails>,
    pub risk: Option<RiskDetails>,
    pub alternatives: Vec<RouteDetails>,
    pub candidates_considered: usize,
    pub excluded_pools: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl QuoteReport {
    pub fn from_quote(quote: &Quote, registry: &dyn TokenRegistry) -> Self {
        let token_in = TokenDetails::resolve(registry, &quote.request.token_in);
        let token_out = TokenDetails::resolve(registry, &quote.request.token_out);
        let route_details = |route: &QuotedRoute| Self::route_details(route, registry);

        let risk = match (&quote.risk, &quote.slippage, quote.min_amount_out, quote.deadline_secs) {
            (Some(risk), Some(verdict), Some(min_out), Some(deadline)) => Some(RiskDetails {
                risk_level: risk.risk_level.to_string(),
                depth_ratio: risk.depth_ratio.to_string(),
                pool_id: risk.pool_id.to_string(),
                message: risk.message.clone(),
                slippage_bps: quote.request.slippage_bps,
                slippage_valid: verdict.is_valid,
                required_slippage_bps: verdict.required_bps,
                slippage_message: verdict.message.clone(),
                min_amount_out: format_amount(min_out, token_out.decimals),
                deadline_secs: deadline,
            }),
            _ => None,
        };

        Self {
            amount_in: format_amount(quote.request.amount_in, token_in.decimals),
            best: quote.search.best.as_ref().map(route_details),
            alternatives: quote.search.ranked.iter().skip(1).map(route_details).collect(),
            candidates_considered: quote.search.candidates_considered,
            excluded_pools: quote
                .search
                .excluded
                .iter()
                .map(|e| format!("{} ({:?})", e.pool_id, e.reason))
                .collect(),
            timestamp: quote.quoted_at,
            risk,
            token_in,
            token_out,
        }
    }

    fn route_details(route: &QuotedRoute, registry: &dyn TokenRegistry) -> RouteDetails {
        let symbol = |address: &TokenAddress| TokenDetails::resolve(registry, address);
        let out_decimals = symbol(&route.token_out).decimals;

        RouteDetails {
            path: route.path().into_iter().map(|t| symbol(t).symbol).collect(),
            amount_out: format_amount(route.amount_out, out_decimals),
            fee_rate: route.fee_rate.to_string(),
            price_impact: route.price_impact.to_string(),
            hops: route.hops.iter().map(|hop| Self::hop_details(hop, registry)).collect(),
        }
    }

    fn hop_details(hop: &HopQuote, registry: &dyn TokenRegistry) -> HopDetails {
        let token_in = TokenDetails::resolve(registry, &hop.token_in);
        let token_out = TokenDetails::resolve(registry, &hop.token_out);
        HopDetails {
            pool_id: hop.pool_id.to_string(),
            amount_in: format_amount(hop.amount_in, token_in.decimals),
            amount_out: format_amount(hop.amount_out, token_out.decimals),
            fee_bps: hop.fee_bps,
            fee_amount: format_amount(hop.fee_amount, token_in.decimals),
            price_impact: hop.price_impact.to_string(),
            depth: hop.depth_ratio.to_string(),
            token_in: token_in.symbol,
            token_out: token_out.symbol,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for QuoteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Quote {} {} -> {}",
            self.amount_in, self.token_in.symbol, self.token_out.symbol
        )?;

        let Some(best) = &self.best else {
            writeln!(f, "  No route found ({} candidates considered)", self.candidates_considered)?;
            return Ok(());
        };

        writeln!(f, "  Route:        {}", best.path.join(" -> "))?;
        writeln!(f, "  Amount out:   {} {}", best.amount_out, self.token_out.symbol)?;
        writeln!(f, "  Price impact: {}", best.price_impact)?;
        writeln!(f, "  Fees:         {}", best.fee_rate)?;
        for (i, hop) in best.hops.iter().enumerate() {
            writeln!(
                f,
                "    {}. {} {} {} -> {} {} (fee {} bps, impact {}, depth {})",
                i + 1,
                hop.pool_id,
                hop.amount_in,
                hop.token_in,
                hop.amount_out,
                hop.token_out,
                hop.fee_bps,
                hop.price_impact,
                hop.depth
            )?;
        }

        if let Some(risk) = &self.risk {
            writeln!(f, "  Risk:         {} ({})", risk.risk_level, risk.message)?;
            writeln!(
                f,
                "  Slippage:     {} bps, {}",
                risk.slippage_bps,
                if risk.slippage_valid { "sufficient" } else { "insufficient" }
            )?;
            writeln!(f, "                {}", risk.slippage_message)?;
            writeln!(f, "  Min received: {} {}", risk.min_amount_out, self.token_out.symbol)?;
            writeln!(f, "  Deadline:     {}s", risk.deadline_secs)?;
        }

        if !self.alternatives.is_empty() {
            writeln!(f, "  Alternatives:")?;
            for route in &self.alternatives {
                writeln!(
                    f,
                    "    {} -> {} (impact {})",
                    route.path.join(" -> "),
                    route.amount_out,
                    route.price_impact
                )?;
            }
        }
        for pool in &self.excluded_pools {
            writeln!(f, "  Excluded pool: {}", pool)?;
        }
        Ok(())
    }
}
