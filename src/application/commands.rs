//! CLI commands and handlers
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::application::quote_service::{QuoteRequest, QuoteService};
use crate::application::quote_worker::{QuoteOutcome, QuoteWorker};
use crate::application::report::QuoteReport;
use crate::domain::risk::RiskAnalyzer;
use crate::domain::routing::Router;
use crate::infrastructure::sources::{SnapshotStore, TokenRegistry};
use crate::shared::config::QuoterConfig;
use crate::shared::errors::AppError;
use crate::shared::types::TokenAddress;
use crate::shared::utils::format_amount;

#[derive(Parser)]
#[command(name = "swapquote")]
#[command(about = "AMM route selection and trade risk quoting")]
pub struct Cli {
    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find the best route for one trade and score its risk
    Quote {
        #[command(flatten)]
        pair: PairArgs,

        /// Amount to sell, in the smallest unit of token in
        #[arg(long)]
        amount_in: u128,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the pools of a snapshot as the router sees them
    Pools {
        /// Pool snapshot (JSON)
        #[arg(long)]
        snapshot: PathBuf,
    },

    /// Read amounts from stdin, one per line, requoting on every change
    Watch {
        #[command(flatten)]
        pair: PairArgs,
    },
}

#[derive(Args, Clone)]
pub struct PairArgs {
    /// Pool snapshot (JSON)
    #[arg(long)]
    pub snapshot: PathBuf,

    #[arg(long)]
    pub token_in: String,

    #[arg(long)]
    pub token_out: String,

    /// Slippage tolerance in basis points
    #[arg(long, default_value_t = 50)]
    pub slippage_bps: u32,

    /// Override the configured maximum path length
    #[arg(long)]
    pub max_hops: Option<usize>,
}

impl PairArgs {
    fn request(&self, amount_in: u128) -> QuoteRequest {
        QuoteRequest {
            token_in: TokenAddress::new(self.token_in.as_str()),
            token_out: TokenAddress::new(self.token_out.as_str()),
            amount_in,
            slippage_bps: self.slippage_bps,
            max_hops: self.max_hops,
        }
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: QuoterConfig) -> Result<(), AppError> {
        match command {
            Commands::Quote { pair, amount_in, json } => {
                Self::execute_quote_command(pair, amount_in, json, config).await
            }
            Commands::Pools { snapshot } => Self::execute_pools_command(&snapshot).await,
            Commands::Watch { pair } => Self::execute_watch_command(pair, config).await,
        }
    }

    fn build_service(snapshot: &Path, config: &QuoterConfig) -> Result<QuoteService, AppError> {
        let store = Arc::new(SnapshotStore::from_json_file(snapshot)?);
        let router = Router::new(store.clone(), store.clone(), store);
        Ok(QuoteService::new(
            router,
            RiskAnalyzer::new(config.risk.clone()),
            config.router.clone(),
        ))
    }

    async fn execute_quote_command(
        pair: PairArgs,
        amount_in: u128,
        json: bool,
        config: QuoterConfig,
    ) -> Result<(), AppError> {
        let service = Self::build_service(&pair.snapshot, &config)?;
        let quote = service.quote(&pair.request(amount_in)).await?;
        let report = QuoteReport::from_quote(&quote, service.token_registry().as_ref());

        if json {
            println!("{}", report.to_json()?);
        } else {
            print!("{}", report);
        }
        Ok(())
    }

    async fn execute_pools_command(snapshot: &Path) -> Result<(), AppError> {
        let store = Arc::new(SnapshotStore::from_json_file(snapshot)?);
        let router = Router::new(store.clone(), store.clone(), store.clone());
        let graph = router.load_graph().await;

        info!(
            "📊 {} usable pools across {} tokens",
            graph.pool_count(),
            graph.token_count()
        );
        let symbol = |address: &TokenAddress| {
            store
                .get_token_metadata(address)
                .map(|m| (m.symbol, m.decimals))
                .unwrap_or_else(|| (address.to_string(), 0))
        };

        for (i, pool) in graph.pools().enumerate() {
            let (symbol_a, decimals_a) = symbol(&pool.token_a);
            let (symbol_b, decimals_b) = symbol(&pool.token_b);
            println!(
                "{}. {} {} <-> {} reserves {} / {} fee {} bps",
                i + 1,
                pool.id,
                symbol_a,
                symbol_b,
                format_amount(pool.reserve_a, decimals_a),
                format_amount(pool.reserve_b, decimals_b),
                pool.fee_bps
            );
        }
        for excluded in graph.excluded() {
            println!("excluded {} ({:?})", excluded.pool_id, excluded.reason);
        }
        Ok(())
    }

    async fn execute_watch_command(pair: PairArgs, config: QuoterConfig) -> Result<(), AppError> {
        let service = Arc::new(Self::build_service(&pair.snapshot, &config)?);
        let registry = service.token_registry().clone();
        let handle = QuoteWorker::spawn(service, &config.worker);
        let mut state = handle.subscribe();

        let printer = tokio::spawn(async move {
            while state.changed().await.is_ok() {
                let current = state.borrow_and_update().clone();
                if current.is_searching {
                    info!("🔍 Searching (request {})...", current.generation);
                    continue;
                }
                match current.outcome {
                    Some(QuoteOutcome::Quoted(quote)) => {
                        print!("{}", QuoteReport::from_quote(&quote, registry.as_ref()));
                    }
                    Some(QuoteOutcome::Rejected(e)) => warn!("⚠️ Request {} rejected: {}", current.generation, e),
                    None => {}
                }
            }
        });

        info!("📥 Reading amounts from stdin, one per line");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<u128>() {
                Ok(amount_in) => {
                    handle.submit(pair.request(amount_in)).await?;
                }
                Err(e) => warn!("⚠️ Ignoring '{}': {}", line, e),
            }
        }

        handle.shutdown().await?;
        printer.await.map_err(|_| AppError::WorkerStopped)?;
        Ok(())
    }
}
