use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use holders_core::{Holder, PriceInfo, PriceMap, TokenPair};
use tracing::{debug, info, warn};

use crate::ports::MarketDataPort;

/// Stage 2: distinct held tokens -> canonical price and symbol
pub struct PriceEnricher {
    market: Arc<dyn MarketDataPort>,
}

impl PriceEnricher {
    pub fn new(market: Arc<dyn MarketDataPort>) -> Self {
        Self { market }
    }

    /// Looks up every distinct token once. Tokens whose lookup fails or that
    /// have no liquidity-bearing pair map to `PriceInfo::unknown()`.
    pub async fn enrich(&self, holders: &[Holder]) -> PriceMap {
        let tokens = distinct_tokens(holders);
        let total = tokens.len();
        info!("🪙 Found {} unique tokens.", total);

        let mut prices = PriceMap::new();
        for (idx, token) in tokens.into_iter().enumerate() {
            debug!("Fetching price and symbol for token {}/{}: {}", idx + 1, total, token);

            let info = match self.market.pairs_for_token(&token).await {
                Ok(pairs) => match select_canonical_pair(&pairs) {
                    Some(pair) => price_info_from(pair),
                    None => {
                        debug!("No valid pairs with liquidity for token {} ({} pairs)", token, pairs.len());
                        PriceInfo::unknown()
                    }
                },
                Err(e) => {
                    warn!("⚠️  Error or no data for token {}: {}", token, e);
                    PriceInfo::unknown()
                }
            };

            prices.insert(token, info);
        }

        let priced = prices.values().filter(|p| p.price_usd.is_some()).count();
        info!("💵 Priced {}/{} tokens.", priced, total);
        prices
    }
}

/// Every token address appearing in any holding, deduplicated.
pub fn distinct_tokens(holders: &[Holder]) -> BTreeSet<String> {
    holders
        .iter()
        .flat_map(|h| h.token_addresses())
        .map(str::to_string)
        .collect()
}

fn has_liquidity(pair: &TokenPair) -> bool {
    matches!(pair.liquidity_usd(), Some(usd) if usd > 0.0)
}

/// Preference order between two pairs: `Greater` means `a` is preferred.
/// Higher USD liquidity first, then the lower dex id, then the lower pair
/// address, so equal-liquidity pairs resolve the same way whatever order
/// the service returned them in.
pub fn compare_pairs(a: &TokenPair, b: &TokenPair) -> Ordering {
    let liq_a = a.liquidity_usd().unwrap_or(0.0);
    let liq_b = b.liquidity_usd().unwrap_or(0.0);

    liq_a
        .total_cmp(&liq_b)
        .then_with(|| b.dex_id.cmp(&a.dex_id))
        .then_with(|| b.pair_address.cmp(&a.pair_address))
}

/// The most liquid pair, ignoring pairs that report no liquidity.
pub fn select_canonical_pair(pairs: &[TokenPair]) -> Option<&TokenPair> {
    let mut best: Option<&TokenPair> = None;

    for pair in pairs.iter().filter(|p| has_liquidity(p)) {
        best = match best {
            Some(current) if compare_pairs(pair, current) != Ordering::Greater => Some(current),
            _ => Some(pair),
        };
    }

    best
}

fn price_info_from(pair: &TokenPair) -> PriceInfo {
    let symbol = pair
        .base_symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    PriceInfo {
        price_usd: pair.price_usd,
        symbol,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::InMemoryMarketData;
    use holders_core::{Holding, Liquidity};

    fn pair(dex: &str, address: &str, price: f64, liquidity_usd: Option<f64>, symbol: &str) -> TokenPair {
        TokenPair {
            chain_id: "solana".to_string(),
            dex_id: dex.to_string(),
            pair_address: address.to_string(),
            price_usd: Some(price),
            liquidity: liquidity_usd.map(|usd| Liquidity { usd: Some(usd), base: None, quote: None }),
            base_symbol: Some(symbol.to_string()),
        }
    }

    fn holder(wallet: &str, tokens: &[&str]) -> Holder {
        Holder {
            owner_wallet: wallet.to_string(),
            token_holdings: tokens.iter().map(|t| Holding::new(*t, 1_000_000, 6)).collect(),
        }
    }

    #[test]
    fn test_selects_highest_liquidity_pair() {
        let pairs = vec![
            pair("raydium", "P1", 1.0, Some(100.0), "LOW"),
            pair("orca", "P2", 2.0, Some(500.0), "HIGH"),
        ];

        let best = select_canonical_pair(&pairs).expect("pair with liquidity");
        assert_eq!(best.pair_address, "P2");
        assert_eq!(best.price_usd, Some(2.0));
    }

    #[test]
    fn test_pairs_without_liquidity_are_ignored() {
        let pairs = vec![
            pair("raydium", "P1", 1.0, None, "A"),
            pair("orca", "P2", 2.0, Some(0.0), "B"),
        ];
        assert!(select_canonical_pair(&pairs).is_none());
        assert!(select_canonical_pair(&[]).is_none());
    }

    #[test]
    fn test_liquidity_tie_is_order_independent() {
        let a = pair("raydium", "P1", 1.0, Some(250.0), "A");
        let b = pair("meteora", "P2", 2.0, Some(250.0), "B");

        let forward = vec![a.clone(), b.clone()];
        let backward = vec![b, a];

        let first = select_canonical_pair(&forward).unwrap();
        let second = select_canonical_pair(&backward).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.dex_id, "meteora");
    }

    #[test]
    fn test_compare_pairs_falls_back_to_pair_address() {
        let a = pair("raydium", "AAA", 1.0, Some(10.0), "A");
        let b = pair("raydium", "BBB", 1.0, Some(10.0), "A");
        assert_eq!(compare_pairs(&a, &b), Ordering::Greater);
        assert_eq!(compare_pairs(&b, &a), Ordering::Less);
        assert_eq!(compare_pairs(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_distinct_tokens_across_holders() {
        let holders = vec![holder("w1", &["A", "B"]), holder("w2", &["B", "C"]), holder("w3", &[])];
        let tokens: Vec<String> = distinct_tokens(&holders).into_iter().collect();
        assert_eq!(tokens, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_enrich_picks_500_liquidity_pair_and_trims_symbol() {
        let mut market = InMemoryMarketData::new();
        market.insert_pairs("A", vec![
            pair("raydium", "P1", 1.0, Some(100.0), "LOW"),
            pair("orca", "P2", 4.0, Some(500.0), "  HIGH \n"),
        ]);

        let enricher = PriceEnricher::new(Arc::new(market));
        let prices = enricher.enrich(&[holder("w1", &["A"])]).await;

        let info = prices.get("A").unwrap();
        assert_eq!(info.price_usd, Some(4.0));
        assert_eq!(info.symbol.as_deref(), Some("HIGH"));
    }

    #[tokio::test]
    async fn test_enrich_degrades_missing_and_failing_tokens() {
        let mut market = InMemoryMarketData::new();
        market.insert_pairs("NOLIQ", vec![pair("raydium", "P1", 3.0, None, "NL")]);
        market.fail_token("BROKEN");

        let holders = vec![holder("w1", &["NOLIQ", "BROKEN", "UNLISTED"])];
        let enricher = PriceEnricher::new(Arc::new(market));
        let prices = enricher.enrich(&holders).await;

        assert_eq!(prices.len(), 3);
        for token in ["NOLIQ", "BROKEN", "UNLISTED"] {
            assert_eq!(prices.get(token), Some(&PriceInfo::unknown()), "token {}", token);
        }
    }

    #[tokio::test]
    async fn test_price_map_keys_match_distinct_tokens() {
        let mut market = InMemoryMarketData::new();
        market.insert_pairs("A", vec![pair("orca", "P1", 1.0, Some(10.0), "A")]);

        let holders = vec![holder("w1", &["A", "B"]), holder("w2", &["A"])];
        let enricher = PriceEnricher::new(Arc::new(market));
        let prices = enricher.enrich(&holders).await;

        let keys: BTreeSet<String> = prices.keys().cloned().collect();
        assert_eq!(keys, distinct_tokens(&holders));
    }
}
