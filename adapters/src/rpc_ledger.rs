use std::str::FromStr;

use holders_core::constants::{TOKEN_2022_PROGRAM, TOKEN_PROGRAM};
use holders_core::{LargestAccount, TokenAccount};
use pipeline::ports::LedgerPort;
use serde::Deserialize;
use serde_json::Value;
use solana_account_decoder::UiAccountData;
use solana_client::client_error::ClientError;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_client::rpc_response::RpcTokenAccountBalance;
use solana_sdk::program_pack::Pack;
use solana_sdk::pubkey::Pubkey;
use spl_token::state::{Account as SplTokenAccount, AccountState};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("RPC error: {0}")]
    Rpc(#[from] ClientError),
    #[error("Malformed token account {account}: {reason}")]
    Malformed { account: String, reason: String },
}

impl LedgerError {
    fn malformed(account: impl ToString, reason: impl ToString) -> Self {
        LedgerError::Malformed { account: account.to_string(), reason: reason.to_string() }
    }
}

/// `tokenAmount` of a jsonParsed token account
#[derive(Debug, Deserialize)]
struct ParsedTokenAmount {
    amount: String,
    decimals: u8,
}

/// `info` object of a jsonParsed token account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenInfo {
    mint: String,
    token_amount: ParsedTokenAmount,
}

/// Ledger adapter over Solana JSON-RPC
pub struct RpcLedger {
    rpc: RpcClient,
    token_programs: Vec<Pubkey>,
}

impl RpcLedger {
    /// SPL Token accounts are always enumerated; Token-2022 only on request.
    pub fn new(rpc_url: &str, include_token_2022: bool) -> Self {
        Self::with_client(RpcClient::new(rpc_url.to_string()), include_token_2022)
    }

    pub fn with_client(rpc: RpcClient, include_token_2022: bool) -> Self {
        let mut token_programs = vec![TOKEN_PROGRAM];
        if include_token_2022 {
            token_programs.push(TOKEN_2022_PROGRAM);
        }

        Self { rpc, token_programs }
    }

    pub fn token_programs(&self) -> &[Pubkey] {
        &self.token_programs
    }

    async fn program_token_accounts(&self, owner: &Pubkey, program: &Pubkey) -> Result<Vec<TokenAccount>, LedgerError> {
        let keyed_accounts = self
            .rpc
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(*program))
            .await?;

        let mut accounts = Vec::with_capacity(keyed_accounts.len());
        for keyed in keyed_accounts {
            let UiAccountData::Json(parsed_account) = &keyed.account.data else {
                debug!("Token account {} was not returned as jsonParsed", keyed.pubkey);
                continue;
            };
            let Some(info) = parsed_account.parsed.get("info") else {
                debug!("Token account {} has no parsed info", keyed.pubkey);
                continue;
            };

            match parse_token_account_info(&keyed.pubkey, info) {
                Ok(account) => accounts.push(account),
                Err(e) => warn!("⚠️  {}", e),
            }
        }

        Ok(accounts)
    }
}

/// Decodes the `info` object of a jsonParsed token account.
pub fn parse_token_account_info(account: &str, info: &Value) -> Result<TokenAccount, LedgerError> {
    let address = Pubkey::from_str(account).map_err(|e| LedgerError::malformed(account, e))?;
    let parsed: ParsedTokenInfo =
        serde_json::from_value(info.clone()).map_err(|e| LedgerError::malformed(account, e))?;
    let raw_amount = parsed
        .token_amount
        .amount
        .parse::<u64>()
        .map_err(|e| LedgerError::malformed(account, e))?;

    Ok(TokenAccount {
        address,
        mint: parsed.mint,
        raw_amount,
        decimals: parsed.token_amount.decimals,
    })
}

/// One entry of `getTokenLargestAccounts`. `None` (with a warning) when the
/// address or the raw balance does not parse.
pub fn largest_account_from(balance: &RpcTokenAccountBalance) -> Option<LargestAccount> {
    let address = match Pubkey::from_str(&balance.address) {
        Ok(address) => address,
        Err(e) => {
            warn!("⚠️  Skipping largest account with invalid address {}: {}", balance.address, e);
            return None;
        }
    };
    let raw_amount = match balance.amount.amount.parse::<u64>() {
        Ok(amount) => amount,
        Err(e) => {
            warn!("⚠️  Skipping largest account {} with invalid balance {:?}: {}", address, balance.amount.amount, e);
            return None;
        }
    };
    Some(LargestAccount { address, raw_amount })
}

/// Folds the per-program enumeration results for `owner`. A failing program
/// only loses its own accounts; the wallet fails only if every program did.
pub fn merge_program_accounts(
    owner: &Pubkey,
    results: Vec<(Pubkey, Result<Vec<TokenAccount>, LedgerError>)>,
) -> Result<Vec<TokenAccount>, LedgerError> {
    let mut accounts = Vec::new();
    let mut last_error = None;
    let mut any_ok = false;

    for (program, result) in results {
        match result {
            Ok(mut found) => {
                any_ok = true;
                accounts.append(&mut found);
            }
            Err(e) => {
                warn!("⚠️  Token accounts of {} under program {} unavailable: {}", owner, program, e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if !any_ok => Err(e),
        _ => Ok(accounts),
    }
}

/// Owner of a raw SPL token account (Token-2022 shares the base layout).
/// `None` for data that is too short or an uninitialized account.
pub fn owner_from_account_data(data: &[u8]) -> Result<Option<Pubkey>, LedgerError> {
    if data.len() < SplTokenAccount::LEN {
        return Ok(None);
    }

    let account = SplTokenAccount::unpack_from_slice(&data[..SplTokenAccount::LEN])
        .map_err(|e| LedgerError::malformed("<account data>", e))?;

    if account.state == AccountState::Uninitialized {
        return Ok(None);
    }
    Ok(Some(account.owner))
}

#[async_trait::async_trait]
impl LedgerPort for RpcLedger {
    async fn largest_accounts(&self, mint: &Pubkey) -> anyhow::Result<Vec<LargestAccount>> {
        let balances = self
            .rpc
            .get_token_largest_accounts(mint)
            .await
            .map_err(LedgerError::from)?;

        Ok(balances.iter().filter_map(largest_account_from).collect())
    }

    async fn account_owner(&self, token_account: &Pubkey) -> anyhow::Result<Option<Pubkey>> {
        let response = self
            .rpc
            .get_account_with_commitment(token_account, self.rpc.commitment())
            .await
            .map_err(LedgerError::from)?;

        let Some(account) = response.value else {
            debug!("Account {} not found", token_account);
            return Ok(None);
        };

        if account.owner != TOKEN_PROGRAM && account.owner != TOKEN_2022_PROGRAM {
            debug!("Account {} is owned by {}, not a token program", token_account, account.owner);
            return Ok(None);
        }

        Ok(owner_from_account_data(&account.data)?)
    }

    async fn token_accounts_by_owner(&self, owner: &Pubkey) -> anyhow::Result<Vec<TokenAccount>> {
        let mut results = Vec::with_capacity(self.token_programs.len());
        for program in &self.token_programs {
            results.push((*program, self.program_token_accounts(owner, program).await));
        }

        let accounts = merge_program_accounts(owner, results)?;
        debug!("Found {} token accounts for wallet {}", accounts.len(), owner);
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use solana_account_decoder::parse_token::UiTokenAmount;
    use solana_sdk::program_option::COption;

    fn balance(address: &str, amount: &str) -> RpcTokenAccountBalance {
        RpcTokenAccountBalance {
            address: address.to_string(),
            amount: UiTokenAmount {
                ui_amount: None,
                decimals: 6,
                amount: amount.to_string(),
                ui_amount_string: String::new(),
            },
        }
    }

    fn token_account(mint: &str) -> TokenAccount {
        TokenAccount { address: Pubkey::new_unique(), mint: mint.to_string(), raw_amount: 1_000, decimals: 6 }
    }

    #[test]
    fn test_token_programs_selection() {
        let spl_only = RpcLedger::new("http://localhost:8899", false);
        assert_eq!(spl_only.token_programs(), &[TOKEN_PROGRAM]);

        let both = RpcLedger::new("http://localhost:8899", true);
        assert_eq!(both.token_programs(), &[TOKEN_PROGRAM, TOKEN_2022_PROGRAM]);
    }

    #[test]
    fn test_token_program_constant_matches_spl_token() {
        assert_eq!(TOKEN_PROGRAM, spl_token::id());
    }

    #[test]
    fn test_parse_token_account_info() {
        let account = Pubkey::new_unique().to_string();
        let info = json!({
            "isNative": false,
            "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "owner": Pubkey::new_unique().to_string(),
            "state": "initialized",
            "tokenAmount": {
                "amount": "42000000",
                "decimals": 6,
                "uiAmount": 42.0,
                "uiAmountString": "42"
            }
        });

        let parsed = parse_token_account_info(&account, &info).unwrap();
        assert_eq!(parsed.address.to_string(), account);
        assert_eq!(parsed.mint, "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
        assert_eq!(parsed.raw_amount, 42_000_000);
        assert_eq!(parsed.decimals, 6);
    }

    #[test]
    fn test_parse_token_account_info_rejects_bad_amount() {
        let account = Pubkey::new_unique().to_string();
        let info = json!({
            "mint": "So11111111111111111111111111111111111111112",
            "tokenAmount": { "amount": "not-a-number", "decimals": 9 }
        });

        let err = parse_token_account_info(&account, &info).unwrap_err();
        assert!(matches!(err, LedgerError::Malformed { .. }));
    }

    #[test]
    fn test_owner_from_account_data() {
        let owner = Pubkey::new_unique();
        let state = SplTokenAccount {
            mint: Pubkey::new_unique(),
            owner,
            amount: 1_000,
            delegate: COption::None,
            state: AccountState::Initialized,
            is_native: COption::None,
            delegated_amount: 0,
            close_authority: COption::None,
        };
        let mut data = vec![0u8; SplTokenAccount::LEN];
        SplTokenAccount::pack(state, &mut data).unwrap();

        assert_eq!(owner_from_account_data(&data).unwrap(), Some(owner));

        // Token-2022 accounts carry extensions after the base layout
        data.extend_from_slice(&[0u8; 32]);
        assert_eq!(owner_from_account_data(&data).unwrap(), Some(owner));
    }

    #[test]
    fn test_owner_from_short_or_uninitialized_data() {
        assert_eq!(owner_from_account_data(&[0u8; 10]).unwrap(), None);
        assert_eq!(owner_from_account_data(&[0u8; SplTokenAccount::LEN]).unwrap(), None);
    }

    #[test]
    fn test_largest_account_skips_unparsable_balance() {
        let address = Pubkey::new_unique();

        let ok = largest_account_from(&balance(&address.to_string(), "9000000")).unwrap();
        assert_eq!(ok, LargestAccount { address, raw_amount: 9_000_000 });

        assert_eq!(largest_account_from(&balance(&address.to_string(), "1.5e6")), None);
        assert_eq!(largest_account_from(&balance(&address.to_string(), "")), None);
        assert_eq!(largest_account_from(&balance("not-a-key", "100")), None);
    }

    #[test]
    fn test_token_2022_failure_keeps_spl_accounts() {
        let owner = Pubkey::new_unique();
        let results = vec![
            (TOKEN_PROGRAM, Ok(vec![token_account("USDC"), token_account("BONK")])),
            (TOKEN_2022_PROGRAM, Err(LedgerError::malformed("token-2022", "rpc timeout"))),
        ];

        let accounts = merge_program_accounts(&owner, results).unwrap();
        let mints: Vec<&str> = accounts.iter().map(|a| a.mint.as_str()).collect();
        assert_eq!(mints, vec!["USDC", "BONK"]);
    }

    #[test]
    fn test_all_programs_failing_fails_wallet() {
        let owner = Pubkey::new_unique();
        let results = vec![
            (TOKEN_PROGRAM, Err(LedgerError::malformed("spl", "rpc timeout"))),
            (TOKEN_2022_PROGRAM, Err(LedgerError::malformed("token-2022", "rpc timeout"))),
        ];

        assert!(merge_program_accounts(&owner, results).is_err());
    }

    #[tokio::test]
    async fn test_failing_rpc_surfaces_as_port_error() {
        let ledger = RpcLedger::with_client(RpcClient::new_mock("fails".to_string()), true);

        assert!(ledger.largest_accounts(&Pubkey::new_unique()).await.is_err());
        assert!(ledger.token_accounts_by_owner(&Pubkey::new_unique()).await.is_err());
    }
}
