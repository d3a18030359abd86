pub mod math;

use serde::{Serialize, Deserialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;

/// A non-zero token position held by a wallet
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Holding {
    pub token_address: String,
    pub raw_amount: u64,
    pub decimals: u8,
    pub token_amount: f64, // decimal-adjusted
}

impl Holding {
    pub fn new(token_address: impl Into<String>, raw_amount: u64, decimals: u8) -> Self {
        Self {
            token_address: token_address.into(),
            raw_amount,
            decimals,
            token_amount: math::ui_amount(raw_amount, decimals),
        }
    }
}

/// A resolved top holder: the owning wallet and everything it holds
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Holder {
    pub owner_wallet: String,
    pub token_holdings: Vec<Holding>,
}

impl Holder {
    pub fn token_addresses(&self) -> impl Iterator<Item = &str> {
        self.token_holdings.iter().map(|h| h.token_address.as_str())
    }
}

/// Canonical market data for one token. Both fields are absent when no
/// liquidity-bearing pair was found.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PriceInfo {
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<f64>,
    pub symbol: Option<String>,
}

impl PriceInfo {
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// token address -> canonical price/symbol
pub type PriceMap = BTreeMap<String, PriceInfo>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnrichedHolding {
    pub token_address: String,
    pub token_amount: f64,
    pub symbol: Option<String>,
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<f64>,
    pub dollar_value: Option<f64>,
}

/// One entry of the exported artifact
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EnrichedHolder {
    pub owner_wallet: String,
    pub token_holdings: Vec<EnrichedHolding>,
}

impl EnrichedHolder {
    /// Holdings with a known, nonzero dollar value of at least
    /// `min_dollar_value`. Holdings without a price never qualify.
    pub fn holdings_worth_at_least(&self, min_dollar_value: f64) -> impl Iterator<Item = &EnrichedHolding> {
        self.token_holdings
            .iter()
            .filter(move |h| matches!(h.dollar_value, Some(v) if v > 0.0 && v >= min_dollar_value))
    }
}

/// Entry of the ledger's "largest accounts" answer, in ranking order
#[derive(Debug, Clone, PartialEq)]
pub struct LargestAccount {
    pub address: Pubkey,
    pub raw_amount: u64,
}

/// A token account owned by a wallet, as reported by the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAccount {
    pub address: Pubkey,
    pub mint: String,
    pub raw_amount: u64,
    pub decimals: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Liquidity {
    pub usd: Option<f64>,
    pub base: Option<f64>,
    pub quote: Option<f64>,
}

/// A trading pair reported by the market-data service
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TokenPair {
    pub chain_id: String,
    pub dex_id: String,
    pub pair_address: String,
    pub price_usd: Option<f64>,
    pub liquidity: Option<Liquidity>,
    pub base_symbol: Option<String>,
}

impl TokenPair {
    pub fn liquidity_usd(&self) -> Option<f64> {
        self.liquidity.as_ref().and_then(|l| l.usd)
    }
}

pub mod constants {
    use solana_sdk::pubkey;
    use solana_sdk::pubkey::Pubkey;

    pub const TOKEN_PROGRAM: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
    pub const TOKEN_2022_PROGRAM: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");

    pub const DEFAULT_DEXSCREENER_URL: &str = "https://api.dexscreener.com";
    pub const DEFAULT_OUTPUT_PATH: &str = "holders_token_values.json";
    pub const DEFAULT_TOP_N: usize = 20;
    pub const DEFAULT_MIN_DOLLAR_VALUE: f64 = 100.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enriched(token: &str, dollar_value: Option<f64>) -> EnrichedHolding {
        EnrichedHolding {
            token_address: token.to_string(),
            token_amount: 1.0,
            symbol: None,
            price_usd: dollar_value,
            dollar_value,
        }
    }

    #[test]
    fn test_holding_new_adjusts_decimals() {
        let h = Holding::new("mintA", 2_500_000, 6);
        assert_eq!(h.token_amount, 2.5);
        assert_eq!(h.raw_amount, 2_500_000);
    }

    #[test]
    fn test_holdings_worth_at_least_skips_unpriced() {
        let holder = EnrichedHolder {
            owner_wallet: "wallet".to_string(),
            token_holdings: vec![
                enriched("cheap", Some(5.0)),
                enriched("unpriced", None),
                enriched("edge", Some(100.0)),
                enriched("rich", Some(2_000.0)),
            ],
        };

        let kept: Vec<&str> = holder
            .holdings_worth_at_least(100.0)
            .map(|h| h.token_address.as_str())
            .collect();
        assert_eq!(kept, vec!["edge", "rich"]);
    }

    #[test]
    fn test_zero_value_hidden_even_without_minimum() {
        let holder = EnrichedHolder {
            owner_wallet: "wallet".to_string(),
            token_holdings: vec![
                enriched("worthless", Some(0.0)),
                enriched("dust", Some(0.01)),
            ],
        };

        let kept: Vec<&str> = holder
            .holdings_worth_at_least(0.0)
            .map(|h| h.token_address.as_str())
            .collect();
        assert_eq!(kept, vec!["dust"]);
    }

    #[test]
    fn test_enriched_holding_json_field_names() {
        let json = serde_json::to_value(enriched("mintA", None)).unwrap();
        assert!(json.get("priceUsd").unwrap().is_null());
        assert!(json.get("dollar_value").unwrap().is_null());
        assert!(json.get("symbol").unwrap().is_null());
        assert_eq!(json["token_address"], "mintA");
    }

    #[test]
    fn test_pair_liquidity_usd() {
        let mut pair = TokenPair::default();
        assert_eq!(pair.liquidity_usd(), None);
        pair.liquidity = Some(Liquidity { usd: Some(500.0), base: None, quote: None });
        assert_eq!(pair.liquidity_usd(), Some(500.0));
    }
}
