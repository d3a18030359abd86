// Port definitions: the boundary between the pipeline and the outside world.
// Adapters for Solana RPC and DexScreener live in the `adapters` crate.

use anyhow::Result;
use holders_core::{LargestAccount, TokenAccount, TokenPair};
use solana_sdk::pubkey::Pubkey;

/// Read-only ledger queries used by the holder resolver
#[async_trait::async_trait]
pub trait LedgerPort: Send + Sync {
    /// Largest token accounts for a mint, in the ledger's ranking order
    async fn largest_accounts(&self, mint: &Pubkey) -> Result<Vec<LargestAccount>>;

    /// Owning wallet of a token account. `Ok(None)` when the account does not
    /// exist or is not a token account.
    async fn account_owner(&self, token_account: &Pubkey) -> Result<Option<Pubkey>>;

    /// Every token account owned by a wallet
    async fn token_accounts_by_owner(&self, owner: &Pubkey) -> Result<Vec<TokenAccount>>;
}

/// Market data lookups used by the price enricher
#[async_trait::async_trait]
pub trait MarketDataPort: Send + Sync {
    /// All trading pairs known for a token address (possibly empty)
    async fn pairs_for_token(&self, token_address: &str) -> Result<Vec<TokenPair>>;
}
