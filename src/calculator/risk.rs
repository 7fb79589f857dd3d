//! Position sizing and stop/target derivation for long trades.

/// Number of units to buy so that hitting the stop-loss loses `risk_percentage`
/// of the account.
///
/// Returns 0 when there is no stop-loss (zero or NaN) or it sits exactly at
/// the entry price.
pub fn size_position_by_risk(
    account_size: f64,
    risk_percentage: f64,
    entry_price: f64,
    stop_loss: f64,
) -> f64 {
    if stop_loss == 0.0 || stop_loss.is_nan() || stop_loss == entry_price {
        return 0.0;
    }

    let risk_amount = account_size * (risk_percentage / 100.0);
    let price_diff = (entry_price - stop_loss).abs();

    risk_amount / price_diff
}

/// Stop-loss price `risk_percentage` below entry.
pub fn derive_stop_loss(entry_price: f64, risk_percentage: f64) -> f64 {
    entry_price * (1.0 - risk_percentage / 100.0)
}

/// Take-profit price above entry at `risk_reward_ratio` times the stop distance.
pub fn derive_take_profit(entry_price: f64, stop_loss: f64, risk_reward_ratio: f64) -> f64 {
    let risk_amount = (entry_price - stop_loss).abs();
    let reward_amount = risk_amount * risk_reward_ratio;

    entry_price + reward_amount
}
