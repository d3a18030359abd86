/// Offline Dry Run
///
/// Runs the full Resolver -> Enricher -> Combiner pipeline against the
/// in-memory ledger and market data, without touching the network.
/// Writes `offline_holders_token_values.json` to the working directory.

use std::sync::Arc;

use holders_core::{LargestAccount, Liquidity, TokenAccount, TokenPair};
use pipeline::mocks::{InMemoryLedger, InMemoryMarketData};
use pipeline::{ScanPipeline, ScanRequest};
use solana_sdk::pubkey::Pubkey;

const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

fn pair(dex: &str, address: &str, price: f64, liquidity_usd: f64, symbol: &str) -> TokenPair {
    TokenPair {
        chain_id: "solana".to_string(),
        dex_id: dex.to_string(),
        pair_address: address.to_string(),
        price_usd: Some(price),
        liquidity: Some(Liquidity { usd: Some(liquidity_usd), base: None, quote: None }),
        base_symbol: Some(symbol.to_string()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Offline Dry Run: holder scan against in-memory data");
    println!("=====================================================\n");

    // 1. Fake ledger: two top accounts, the second one is ignored below
    let mint = Pubkey::new_unique();
    let whale_account = Pubkey::new_unique();
    let whale_wallet = Pubkey::new_unique();
    let exchange_account = Pubkey::new_unique();

    let mut ledger = InMemoryLedger::new();
    ledger.insert_largest(mint, vec![
        LargestAccount { address: whale_account, raw_amount: 9_000_000 },
        LargestAccount { address: exchange_account, raw_amount: 4_000_000 },
    ]);
    ledger.insert_owner(whale_account, whale_wallet);
    ledger.insert_wallet(whale_wallet, vec![
        TokenAccount { address: Pubkey::new_unique(), mint: USDC.to_string(), raw_amount: 2_500_000_000, decimals: 6 },
        TokenAccount { address: Pubkey::new_unique(), mint: BONK.to_string(), raw_amount: 12_345_678_900_000, decimals: 5 },
        TokenAccount { address: Pubkey::new_unique(), mint: mint.to_string(), raw_amount: 9_000_000, decimals: 6 },
    ]);

    // 2. Fake market data: the scanned mint itself is unlisted
    let mut market = InMemoryMarketData::new();
    market.insert_pairs(USDC, vec![pair("orca", "USDC-P1", 1.0, 5_000_000.0, "USDC")]);
    market.insert_pairs(BONK, vec![
        pair("raydium", "BONK-P1", 0.000021, 100_000.0, "Bonk"),
        pair("orca", "BONK-P2", 0.000022, 900_000.0, "Bonk "),
    ]);

    // 3. Run
    let pipeline = ScanPipeline::new(
        Arc::new(ledger),
        Arc::new(market),
        "offline_holders_token_values.json",
    );
    let request = ScanRequest::new(&mint.to_string(), 10, &exchange_account.to_string())?;
    let combined = pipeline.run(&request).await?;

    for holder in &combined {
        println!("👛 {}", holder.owner_wallet);
        for h in &holder.token_holdings {
            println!(
                "   {:<44} {:>22.6} {:<6} {:>12}",
                h.token_address,
                h.token_amount,
                h.symbol.as_deref().unwrap_or("N/A"),
                h.dollar_value.map(|v| format!("${:.2}", v)).unwrap_or_else(|| "-".to_string()),
            );
        }
    }

    println!("\n💾 Written to {}", pipeline.output_path().display());
    Ok(())
}
