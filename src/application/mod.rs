//! Application layer - use cases, the quote worker and the CLI

pub mod commands;
pub mod quote_service;
pub mod quote_worker;
pub mod report;

pub use commands::{Cli, CommandExecutor, Commands};
pub use quote_service::{Quote, QuoteRequest, QuoteService};
pub use quote_worker::{QuoteHandle, QuoteOutcome, QuoteState, QuoteWorker, RequestGeneration};
pub use report::QuoteReport;
