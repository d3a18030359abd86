use std::env;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tracing::{error, info};

// Internal Crates
use adapters::{DexScreenerClient, RpcLedger};
use pipeline::{ScanPipeline, ScanRequest};

mod cli;
mod config;
mod report;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();

    // 1. Logging
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string())
        )
        .init();

    let cli = cli::Cli::parse();
    info!("🚀 Holder Scanner Bootstrapping...");

    // 2. Configuration (Fail Fast)
    let config = match config::ScanConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ CRITICAL: Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    info!("✅ Config Loaded & Validated: RPC={}, DexScreener={}", config.rpc_url, config.dexscreener_url);

    let settings = cli.settings(&config);

    // 3. Input validation happens before any network call
    let request = match ScanRequest::new(&cli.mint, settings.top_n, &cli.ignore) {
        Ok(request) => request,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };
    if !request.ignore.is_empty() {
        info!("🙈 Ignoring {} addresses", request.ignore.len());
    }

    // 4. Adapters -> Pipeline
    let ledger = Arc::new(RpcLedger::new(&config.rpc_url, config.include_token_2022));
    let market = Arc::new(DexScreenerClient::new(&config.dexscreener_url));
    let pipeline = ScanPipeline::new(ledger, market, &settings.output_path);

    // 5. Run
    let combined = match pipeline.run(&request).await {
        Ok(combined) => combined,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };
    info!("✅ Data combined successfully!");

    println!("{}", report::render(&combined, settings.min_dollar_value));
    info!("📦 Combined data for {} wallets available at {}", combined.len(), pipeline.output_path().display());
}
