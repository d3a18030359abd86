use clap::Parser;

use crate::config::ScanConfig;

/// Fetch the top holders of a token and value their portfolios
#[derive(Parser, Debug, Clone)]
#[command(name = "holder-scan", version)]
pub struct Cli {
    /// Token mint address
    #[arg(long, short = 'm')]
    pub mint: String,

    /// Number of top holders (defaults to DEFAULT_TOP_N)
    #[arg(long, short = 'n')]
    pub top_n: Option<usize>,

    /// Comma-separated wallet or token account addresses to ignore
    #[arg(long, short = 'i', default_value = "")]
    pub ignore: String,

    /// Only display holdings worth at least this many dollars
    #[arg(long)]
    pub min_dollar_value: Option<f64>,

    /// Where to write the combined JSON (defaults to OUTPUT_PATH)
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

/// CLI values layered over the loaded configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub top_n: usize,
    pub min_dollar_value: f64,
    pub output_path: String,
}

impl Cli {
    pub fn settings(&self, config: &ScanConfig) -> RunSettings {
        RunSettings {
            top_n: self.top_n.unwrap_or(config.default_top_n),
            min_dollar_value: self.min_dollar_value.unwrap_or(config.min_dollar_value),
            output_path: self.output.clone().unwrap_or_else(|| config.output_path.clone()),
        }
    }
}
