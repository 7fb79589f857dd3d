//! User preferences: default costs, include-flags, display currency and theme.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::report::find_currency;

/// Colour scheme for rendered reports and front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" | "auto" => Some(Self::System),
            _ => None,
        }
    }
}

/// Defaults applied to new calculations plus display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default commission percentage per side
    pub default_commission: f64,

    /// Default flat slippage cost
    pub default_slippage: f64,

    /// Default flat position fees
    pub default_position_fees: f64,

    /// Default tax percentage on profits
    pub default_tax_rate: f64,

    pub include_commission: bool,
    pub include_slippage: bool,
    pub include_position_fees: bool,
    pub include_tax: bool,

    /// Haptic feedback on interactive front ends
    pub haptic_feedback: bool,

    /// ISO code of the display currency
    pub currency: String,

    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_commission: 0.1,
            default_slippage: 0.0,
            default_position_fees: 0.0,
            default_tax_rate: 0.0,
            include_commission: true,
            include_slippage: false,
            include_position_fees: false,
            include_tax: false,
            haptic_feedback: true,
            currency: "USD".to_string(),
            theme: Theme::System,
        }
    }
}

const KEYS: &[&str] = &[
    "default_commission",
    "default_slippage",
    "default_position_fees",
    "default_tax_rate",
    "include_commission",
    "include_slippage",
    "include_position_fees",
    "include_tax",
    "haptic_feedback",
    "currency",
    "theme",
];

impl Settings {
    /// Names accepted by [`Settings::get`] and [`Settings::set`].
    pub fn keys() -> &'static [&'static str] {
        KEYS
    }

    /// Current value of one setting, rendered as text.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "default_commission" => self.default_commission.to_string(),
            "default_slippage" => self.default_slippage.to_string(),
            "default_position_fees" => self.default_position_fees.to_string(),
            "default_tax_rate" => self.default_tax_rate.to_string(),
            "include_commission" => self.include_commission.to_string(),
            "include_slippage" => self.include_slippage.to_string(),
            "include_position_fees" => self.include_position_fees.to_string(),
            "include_tax" => self.include_tax.to_string(),
            "haptic_feedback" => self.haptic_feedback.to_string(),
            "currency" => self.currency.clone(),
            "theme" => self.theme.as_str().to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Parse `value` and store it under `key`. Leaves `self` untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "default_commission" => self.default_commission = parse_amount(key, value)?,
            "default_slippage" => self.default_slippage = parse_amount(key, value)?,
            "default_position_fees" => self.default_position_fees = parse_amount(key, value)?,
            "default_tax_rate" => {
                let rate = parse_amount(key, value)?;
                if rate > 100.0 {
                    bail!("default_tax_rate cannot exceed 100 (got {})", rate);
                }
                self.default_tax_rate = rate;
            }
            "include_commission" => self.include_commission = parse_flag(key, value)?,
            "include_slippage" => self.include_slippage = parse_flag(key, value)?,
            "include_position_fees" => self.include_position_fees = parse_flag(key, value)?,
            "include_tax" => self.include_tax = parse_flag(key, value)?,
            "haptic_feedback" => self.haptic_feedback = parse_flag(key, value)?,
            "currency" => {
                let currency = find_currency(value)
                    .ok_or_else(|| anyhow!("Unknown currency code: {}", value.trim()))?;
                self.currency = currency.code.to_string();
            }
            "theme" => {
                self.theme = Theme::parse(value)
                    .ok_or_else(|| anyhow!("theme must be light, dark or system"))?;
            }
            _ => bail!(
                "Unknown setting '{}'. Valid keys: {}",
                key,
                KEYS.join(", ")
            ),
        }
        Ok(())
    }
}

fn parse_amount(key: &str, value: &str) -> Result<f64> {
    let amount: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("{} expects a number, got '{}'", key, value))?;
    if !amount.is_finite() || amount < 0.0 {
        bail!("{} must be a non-negative number (got {})", key, value);
    }
    Ok(amount)
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => bail!("{} expects true or false, got '{}'", key, value),
    }
}
