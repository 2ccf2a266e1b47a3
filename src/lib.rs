//! Swapquote - AMM route selection and trade risk analysis
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::{QuoteHandle, QuoteRequest, QuoteService, QuoteWorker};
pub use domain::risk::{RiskAnalyzer, RiskAssessment, RiskLevel};
pub use domain::routing::{QuotedRoute, RouteRequest, RouteSearchResult, Router};
pub use infrastructure::SnapshotStore;
pub use shared::config::QuoterConfig;
