use holders_core::{Liquidity, TokenPair};
use pipeline::ports::MarketDataPort;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unable to fetch data for {token}. Status code: {status}")]
    Status { token: String, status: StatusCode },
    #[error("Invalid response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// `priceUsd` is documented as a decimal string but some pairs send a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DecimalValue {
    Number(f64),
    Text(String),
}

impl DecimalValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            DecimalValue::Number(n) => Some(*n),
            DecimalValue::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BaseToken {
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPair {
    #[serde(default)]
    chain_id: String,
    #[serde(default)]
    dex_id: String,
    #[serde(default)]
    pair_address: String,
    price_usd: Option<DecimalValue>,
    liquidity: Option<Liquidity>,
    base_token: Option<BaseToken>,
}

impl From<RawPair> for TokenPair {
    fn from(raw: RawPair) -> Self {
        TokenPair {
            chain_id: raw.chain_id,
            dex_id: raw.dex_id,
            pair_address: raw.pair_address,
            price_usd: raw.price_usd.as_ref().and_then(DecimalValue::as_f64),
            liquidity: raw.liquidity,
            base_symbol: raw.base_token.and_then(|t| t.symbol),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    pairs: Option<Vec<RawPair>>,
}

/// Decodes a `/latest/dex/tokens/{address}` body. `"pairs": null` is an
/// empty list.
pub fn parse_pairs(body: &str) -> Result<Vec<TokenPair>, MarketDataError> {
    let response: TokensResponse = serde_json::from_str(body)?;
    Ok(response
        .pairs
        .unwrap_or_default()
        .into_iter()
        .map(TokenPair::from)
        .collect())
}

/// Anything but 200 is an upstream failure for `token_address`.
pub fn check_status(token_address: &str, status: StatusCode) -> Result<(), MarketDataError> {
    if status != StatusCode::OK {
        return Err(MarketDataError::Status { token: token_address.to_string(), status });
    }
    Ok(())
}

/// Market-data adapter over the public DexScreener API
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn tokens_url(&self, token_address: &str) -> String {
        format!("{}/latest/dex/tokens/{}", self.base_url, token_address)
    }

    pub async fn fetch_pairs(&self, token_address: &str) -> Result<Vec<TokenPair>, MarketDataError> {
        let url = self.tokens_url(token_address);
        let response = self.client.get(&url).send().await?;

        check_status(token_address, response.status())?;

        let body = response.text().await?;
        let pairs = parse_pairs(&body)?;
        debug!("DexScreener returned {} pairs for {}", pairs.len(), token_address);
        Ok(pairs)
    }
}

#[async_trait::async_trait]
impl MarketDataPort for DexScreenerClient {
    async fn pairs_for_token(&self, token_address: &str) -> anyhow::Result<Vec<TokenPair>> {
        Ok(self.fetch_pairs(token_address).await?)
    }
}
