use std::fmt::Write;

use holders_core::{math, EnrichedHolder};

/// Renders the per-wallet tables, keeping only holdings whose dollar value
/// is known, nonzero and at least `min_dollar_value`. Wallets with nothing left are
/// omitted.
pub fn render(combined: &[EnrichedHolder], min_dollar_value: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Wallet Holdings (Filtered by Dollar Value ≥ ${:.2})", min_dollar_value);
    let _ = writeln!(out, "{}", "=".repeat(120));

    let mut shown = 0;
    for holder in combined {
        let rows: Vec<_> = holder.holdings_worth_at_least(min_dollar_value).collect();
        if rows.is_empty() {
            continue;
        }
        shown += 1;

        let _ = writeln!(out, "\nWallet: {}", holder.owner_wallet);
        let _ = writeln!(
            out,
            "  {:<44} {:>20} {:<10} {:>16} {:>16}",
            "Token Address", "Amount", "Symbol", "Price (USD)", "Dollar Value"
        );
        let _ = writeln!(out, "  {}", "-".repeat(110));

        for h in rows {
            let _ = writeln!(
                out,
                "  {:<44} {:>20.6} {:<10} {:>16} {:>16}",
                h.token_address,
                h.token_amount,
                h.symbol.as_deref().unwrap_or("N/A"),
                h.price_usd.map(|p| format!("{}", p)).unwrap_or_else(|| "N/A".to_string()),
                h.dollar_value.map(|v| format!("{:.2}", math::round_cents(v))).unwrap_or_default(),
            );
        }
    }

    if shown == 0 {
        let _ = writeln!(out, "\nNo holdings worth at least ${:.2}.", min_dollar_value);
    }

    out
}
