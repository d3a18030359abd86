use std::path::{Path, PathBuf};

use anyhow::Context;
use holders_core::{math, EnrichedHolder, EnrichedHolding, Holder, PriceInfo, PriceMap};
use serde::Serialize;
use tokio::fs::{create_dir_all, write};
use tracing::info;

/// Stage 3: joins holdings with prices and exports the result
pub struct Combiner {
    output_path: PathBuf,
}

impl Combiner {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self { output_path: output_path.into() }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Combines and writes the JSON artifact, returning the combined data.
    pub async fn combine_and_persist(&self, holders: &[Holder], prices: &PriceMap) -> anyhow::Result<Vec<EnrichedHolder>> {
        let combined = combine(holders, prices);
        persist_json(&self.output_path, &combined).await?;
        info!("💾 Combined data for {} wallets saved to {}", combined.len(), self.output_path.display());
        Ok(combined)
    }
}

/// One `EnrichedHolder` per holder, holding order preserved. Tokens missing
/// from `prices` get no symbol, no price and no dollar value.
pub fn combine(holders: &[Holder], prices: &PriceMap) -> Vec<EnrichedHolder> {
    let unknown = PriceInfo::unknown();

    holders
        .iter()
        .map(|holder| {
            let token_holdings = holder
                .token_holdings
                .iter()
                .map(|holding| {
                    let info = prices.get(&holding.token_address).unwrap_or(&unknown);
                    EnrichedHolding {
                        token_address: holding.token_address.clone(),
                        token_amount: holding.token_amount,
                        symbol: info.symbol.clone(),
                        price_usd: info.price_usd,
                        dollar_value: math::dollar_value(holding.token_amount, info.price_usd),
                    }
                })
                .collect();

            EnrichedHolder {
                owner_wallet: holder.owner_wallet.clone(),
                token_holdings,
            }
        })
        .collect()
}

/// Serializes with 4-space indentation.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

pub async fn persist_json(path: &Path, combined: &[EnrichedHolder]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }

    let bytes = to_json_pretty(combined).context("Failed to serialize combined data")?;
    write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
