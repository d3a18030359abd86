pub mod rpc_ledger;   // Solana JSON-RPC ledger queries
pub mod dexscreener;  // DexScreener pair lookups

pub use rpc_ledger::{LedgerError, RpcLedger};
pub use dexscreener::{DexScreenerClient, MarketDataError};
