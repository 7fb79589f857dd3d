//! Display formatting for money, percentages and ratios.

use rust_decimal::{Decimal, RoundingStrategy};

use super::Currency;

const NOT_AVAILABLE: &str = "N/A";

/// Format an amount in `currency`, e.g. `-$1,234.50`.
///
/// Rounds half away from zero to the currency's minor units.
pub fn format_currency(value: f64, currency: &Currency) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }

    let (negative, plain) = match to_minor_units(value, currency) {
        Some(rounded) => {
            let negative = rounded.is_sign_negative() && !rounded.is_zero();
            (negative, format!("{:.*}", currency.decimals as usize, rounded.abs()))
        }
        // Outside Decimal's range; plain float formatting is close enough.
        None => (
            value < 0.0,
            format!("{:.*}", currency.decimals as usize, value.abs()),
        ),
    };

    let sign = if negative { "-" } else { "" };
    format!("{}{}{}", sign, currency.symbol, group_thousands(&plain))
}

/// `value` rounded half away from zero to the currency's minor units.
fn to_minor_units(value: f64, currency: &Currency) -> Option<Decimal> {
    Decimal::try_from(value).ok().map(|d| {
        d.round_dp_with_strategy(currency.decimals, RoundingStrategy::MidpointAwayFromZero)
    })
}

/// Like [`format_currency`] but with an explicit `+` on gains.
pub fn format_signed_currency(value: f64, currency: &Currency) -> String {
    let formatted = format_currency(value, currency);
    let rounds_to_zero = formatted.trim_start_matches(currency.symbol) == zero(currency);
    if value.is_finite() && value > 0.0 && !rounds_to_zero {
        format!("+{}", formatted)
    } else {
        formatted
    }
}

/// Two-decimal percentage, e.g. `49.75%`.
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("{:.2}%", value)
}

/// Risk/reward as `1:x.xx`.
pub fn format_ratio(value: f64) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_string();
    }
    format!("1:{:.2}", value)
}

fn zero(currency: &Currency) -> String {
    format!("{:.*}", currency.decimals as usize, 0.0)
}

/// Insert `,` between groups of three integer digits.
fn group_thousands(plain: &str) -> String {
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}
