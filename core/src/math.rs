/// Converts a raw integer balance into its human-readable amount.
#[inline]
pub fn ui_amount(raw_amount: u64, decimals: u8) -> f64 {
    raw_amount as f64 / 10f64.powi(decimals as i32)
}

/// amount × price, absent when the price is unknown
#[inline]
pub fn dollar_value(amount: f64, price_usd: Option<f64>) -> Option<f64> {
    price_usd.map(|price| amount * price)
}

/// Rounds a dollar value to cents for display
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
