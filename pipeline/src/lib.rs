pub mod ports;
pub mod resolver;  // stage 1: holders -> wallets -> holdings
pub mod enricher;  // stage 2: tokens -> price/symbol
pub mod combiner;  // stage 3: join + export
pub mod mocks;


use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use holders_core::EnrichedHolder;
use solana_sdk::pubkey::Pubkey;
use tracing::{info, warn};

use crate::combiner::Combiner;
use crate::enricher::PriceEnricher;
use crate::ports::{LedgerPort, MarketDataPort};
use crate::resolver::HolderResolver;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Please enter a valid token mint address")]
    EmptyMint,
    #[error("Invalid token mint address {0}: {1}")]
    InvalidMint(String, String),
    #[error("Number of top holders must be at least 1")]
    ZeroTopN,
    #[error("No data fetched for token mint address {0}")]
    NoHolders(Pubkey),
}

/// Validated user input for one scan
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub mint: Pubkey,
    pub top_n: usize,
    pub ignore: HashSet<Pubkey>,
}

impl ScanRequest {
    /// Validates the raw inputs before anything touches the network.
    /// Ignore-list entries that are not valid addresses are dropped with a
    /// warning since they can never match.
    pub fn new(mint: &str, top_n: usize, ignore_list: &str) -> Result<Self, ScanError> {
        let mint = mint.trim();
        if mint.is_empty() {
            return Err(ScanError::EmptyMint);
        }
        let mint = Pubkey::from_str(mint).map_err(|e| ScanError::InvalidMint(mint.to_string(), e.to_string()))?;

        if top_n == 0 {
            return Err(ScanError::ZeroTopN);
        }

        Ok(Self {
            mint,
            top_n,
            ignore: parse_ignore_list(ignore_list),
        })
    }
}

/// Splits a comma-separated list of addresses.
pub fn parse_ignore_list(raw: &str) -> HashSet<Pubkey> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match Pubkey::from_str(s) {
            Ok(key) => Some(key),
            Err(e) => {
                warn!("⚠️  Ignoring invalid address in ignore list '{}': {}", s, e);
                None
            }
        })
        .collect()
}

/// Resolver -> Enricher -> Combiner, one call at a time
pub struct ScanPipeline {
    resolver: HolderResolver,
    enricher: PriceEnricher,
    combiner: Combiner,
}

impl ScanPipeline {
    pub fn new(
        ledger: Arc<dyn LedgerPort>,
        market: Arc<dyn MarketDataPort>,
        output_path: impl AsRef<Path>,
    ) -> Self {
        Self {
            resolver: HolderResolver::new(ledger),
            enricher: PriceEnricher::new(market),
            combiner: Combiner::new(output_path.as_ref()),
        }
    }

    pub fn output_path(&self) -> &Path {
        self.combiner.output_path()
    }

    pub async fn run(&self, request: &ScanRequest) -> anyhow::Result<Vec<EnrichedHolder>> {
        info!("ℹ️  Fetching top holders...");
        let holders = self.resolver.resolve(&request.mint, request.top_n, &request.ignore).await;
        if holders.is_empty() {
            return Err(ScanError::NoHolders(request.mint).into());
        }
        info!("✅ Fetched data for {} holders.", holders.len());

        info!("ℹ️  Fetching token prices...");
        let prices = self.enricher.enrich(&holders).await;

        info!("ℹ️  Combining holders data with token prices...");
        self.combiner.combine_and_persist(&holders, &prices).await
    }
}
