// In-memory port implementations for tests and offline dry runs

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};
use holders_core::{LargestAccount, TokenAccount, TokenPair};
use solana_sdk::pubkey::Pubkey;

use crate::ports::{LedgerPort, MarketDataPort};

/// Ledger backed by plain maps. Accounts or wallets registered as failing
/// return an error instead of data.
#[derive(Default)]
pub struct InMemoryLedger {
    largest: HashMap<Pubkey, Vec<LargestAccount>>,
    owners: HashMap<Pubkey, Pubkey>,
    wallets: HashMap<Pubkey, Vec<TokenAccount>>,
    failing: HashSet<Pubkey>,
    calls: AtomicUsize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_largest(&mut self, mint: Pubkey, accounts: Vec<LargestAccount>) {
        self.largest.insert(mint, accounts);
    }

    pub fn insert_owner(&mut self, token_account: Pubkey, owner: Pubkey) {
        self.owners.insert(token_account, owner);
    }

    pub fn insert_wallet(&mut self, owner: Pubkey, accounts: Vec<TokenAccount>) {
        self.wallets.insert(owner, accounts);
    }

    /// Any query keyed by `key` (mint, token account or wallet) fails.
    pub fn fail_on(&mut self, key: Pubkey) {
        self.failing.insert(key);
    }

    /// Number of queries served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn check(&self, key: &Pubkey) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.contains(key) {
            return Err(anyhow!("simulated ledger failure for {}", key));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LedgerPort for InMemoryLedger {
    async fn largest_accounts(&self, mint: &Pubkey) -> Result<Vec<LargestAccount>> {
        self.check(mint)?;
        Ok(self.largest.get(mint).cloned().unwrap_or_default())
    }

    async fn account_owner(&self, token_account: &Pubkey) -> Result<Option<Pubkey>> {
        self.check(token_account)?;
        Ok(self.owners.get(token_account).copied())
    }

    async fn token_accounts_by_owner(&self, owner: &Pubkey) -> Result<Vec<TokenAccount>> {
        self.check(owner)?;
        Ok(self.wallets.get(owner).cloned().unwrap_or_default())
    }
}

/// Market data backed by a map of token address -> pairs
#[derive(Default)]
pub struct InMemoryMarketData {
    pairs: HashMap<String, Vec<TokenPair>>,
    failing: HashSet<String>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_pairs(&mut self, token_address: &str, pairs: Vec<TokenPair>) {
        self.pairs.insert(token_address.to_string(), pairs);
    }

    pub fn fail_token(&mut self, token_address: &str) {
        self.failing.insert(token_address.to_string());
    }
}

#[async_trait::async_trait]
impl MarketDataPort for InMemoryMarketData {
    async fn pairs_for_token(&self, token_address: &str) -> Result<Vec<TokenPair>> {
        if self.failing.contains(token_address) {
            return Err(anyhow!("simulated market data failure for {}", token_address));
        }
        Ok(self.pairs.get(token_address).cloned().unwrap_or_default())
    }
}
