use std::collections::HashSet;
use std::sync::Arc;

use holders_core::{Holder, Holding, TokenAccount};
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, error, info, warn};

use crate::ports::LedgerPort;

/// Stage 1: top holder accounts -> owning wallets -> wallet holdings
pub struct HolderResolver {
    ledger: Arc<dyn LedgerPort>,
}

impl HolderResolver {
    pub fn new(ledger: Arc<dyn LedgerPort>) -> Self {
        Self { ledger }
    }

    /// Resolves up to `top_n` holders of `mint`, skipping any account or
    /// wallet found in `ignore`. Partial failures are logged and skipped; a
    /// failing top-holder query yields an empty list.
    pub async fn resolve(&self, mint: &Pubkey, top_n: usize, ignore: &HashSet<Pubkey>) -> Vec<Holder> {
        info!("🔍 Fetching top {} holders for token: {}", top_n, mint);

        let top_accounts: Vec<_> = match self.ledger.largest_accounts(mint).await {
            Ok(accounts) => accounts.into_iter().take(top_n).collect(),
            Err(e) => {
                error!("❌ Error fetching top holders for {}: {}", mint, e);
                return Vec::new();
            }
        };

        let total = top_accounts.len();
        info!("📋 Retrieved {} top holders.", total);

        let mut holders = Vec::with_capacity(total);
        let mut seen_wallets: HashSet<Pubkey> = HashSet::new();

        for (idx, account) in top_accounts.iter().enumerate() {
            let rank = idx + 1;

            if ignore.contains(&account.address) {
                info!("⏭️  Skipping holder {}/{}: {} (ignored)", rank, total, account.address);
                continue;
            }

            debug!("Processing holder {}/{}: {}", rank, total, account.address);

            let owner = match self.ledger.account_owner(&account.address).await {
                Ok(Some(owner)) => owner,
                Ok(None) => {
                    warn!("⚠️  Owner wallet not found for token account: {}", account.address);
                    continue;
                }
                Err(e) => {
                    warn!("⚠️  Error fetching wallet owner for token account {}: {}", account.address, e);
                    continue;
                }
            };

            if ignore.contains(&owner) {
                info!("⏭️  Skipping holder {}/{}: {} (ignored wallet)", rank, total, owner);
                continue;
            }

            // Several top accounts can belong to one wallet; the best-ranked one wins.
            if !seen_wallets.insert(owner) {
                debug!("Wallet {} already resolved from a higher-ranked account", owner);
                continue;
            }

            let token_accounts = match self.ledger.token_accounts_by_owner(&owner).await {
                Ok(accounts) => accounts,
                Err(e) => {
                    warn!("⚠️  Error fetching token accounts for wallet {}: {}", owner, e);
                    continue;
                }
            };

            let token_holdings = collect_holdings(&token_accounts);
            info!(
                "👛 Holder {}/{} -> wallet {} ({} token accounts, {} holdings)",
                rank,
                total,
                owner,
                token_accounts.len(),
                token_holdings.len()
            );

            holders.push(Holder {
                owner_wallet: owner.to_string(),
                token_holdings,
            });
        }

        info!("✅ All holders processed. {} wallets resolved.", holders.len());
        holders
    }
}

/// Drops zero-decimal tokens (NFT-like) and empty balances, keeping order.
pub fn collect_holdings(accounts: &[TokenAccount]) -> Vec<Holding> {
    accounts
        .iter()
        .filter(|account| account.decimals != 0)
        .map(|account| Holding::new(account.mint.clone(), account.raw_amount, account.decimals))
        .filter(|holding| {
            if holding.token_amount == 0.0 {
                debug!("Skipping token with 0 amount: {}", holding.token_address);
                return false;
            }
            true
        })
        .collect()
}
