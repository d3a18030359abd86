use std::env;

use holders_core::constants::{
    DEFAULT_DEXSCREENER_URL, DEFAULT_MIN_DOLLAR_VALUE, DEFAULT_OUTPUT_PATH, DEFAULT_TOP_N,
};

#[derive(Debug, serde::Deserialize, Clone, PartialEq)]
pub struct ScanConfig {
    #[serde(alias = "RPC_URL")]
    pub rpc_url: String,
    #[serde(alias = "DEXSCREENER_URL", default = "default_dexscreener_url")]
    pub dexscreener_url: String,
    #[serde(alias = "OUTPUT_PATH", default = "default_output_path")]
    pub output_path: String,
    #[serde(alias = "DEFAULT_TOP_N", default = "default_top_n")]
    pub default_top_n: usize,
    #[serde(alias = "MIN_DOLLAR_VALUE", default = "default_min_dollar_value")]
    pub min_dollar_value: f64,
    #[serde(alias = "INCLUDE_TOKEN_2022", default)]
    pub include_token_2022: bool,
}

fn default_dexscreener_url() -> String { DEFAULT_DEXSCREENER_URL.to_string() }
fn default_output_path() -> String { DEFAULT_OUTPUT_PATH.to_string() }
fn default_top_n() -> usize { DEFAULT_TOP_N }
fn default_min_dollar_value() -> f64 { DEFAULT_MIN_DOLLAR_VALUE }

impl ScanConfig {
    /// Optional `config.json` (or .toml/.yaml) in the working directory,
    /// overridden by environment variables. `SOL_RPC` is only a fallback for
    /// a missing `RPC_URL`.
    pub fn new() -> Result<Self, String> {
        Self::load(env::var("SOL_RPC").ok())
    }

    pub(crate) fn load(sol_rpc: Option<String>) -> Result<Self, String> {
        let mut builder = ::config::Config::builder();
        if let Some(url) = sol_rpc.filter(|url| !url.trim().is_empty()) {
            builder = builder
                .set_default("rpc_url", url)
                .map_err(|e| format!("Config Build Error: {}", e))?;
        }

        let s = builder
            .add_source(::config::File::with_name("config").required(false))
            .add_source(::config::Environment::default())
            .build()
            .map_err(|e| format!("Config Build Error: {}", e))?;

        let config: ScanConfig = s.try_deserialize()
            .map_err(|e| format!("Config Deserialize Error: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Validates configuration values at startup (Fail Fast)
    pub fn validate(&self) -> Result<(), String> {
        if !self.rpc_url.starts_with("http") {
            return Err(format!("Invalid RPC_URL: must start with http/https. Got: {}", self.rpc_url));
        }
        if !self.dexscreener_url.starts_with("http") {
            return Err(format!("Invalid DEXSCREENER_URL: must start with http/https. Got: {}", self.dexscreener_url));
        }
        if self.output_path.trim().is_empty() {
            return Err("OUTPUT_PATH cannot be empty".into());
        }
        if self.default_top_n == 0 {
            return Err("DEFAULT_TOP_N must be at least 1".into());
        }
        if self.min_dollar_value.is_nan() || self.min_dollar_value < 0.0 {
            return Err(format!("MIN_DOLLAR_VALUE must be ≥ 0. Got: {}", self.min_dollar_value));
        }

        if self.rpc_url.contains("api.mainnet-beta.solana.com") {
            tracing::warn!("⚠️  Using the public mainnet RPC. getTokenLargestAccounts is heavily rate limited there.");
        }

        Ok(())
    }
}


#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
