//! Trade input record: prices, quantity and the cost structure of a single trade.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Everything the calculator needs to evaluate one trade.
///
/// Percentages are expressed in percent (`0.1` means 0.1%), cost amounts in
/// the display currency. The record is not validated on construction; see
/// [`TradeInput::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInput {
    /// Price per unit at open
    pub entry_price: f64,

    /// Price per unit at close
    pub exit_price: f64,

    /// Units traded
    pub quantity: f64,

    /// Commission percentage, charged on both entry and exit notional
    #[serde(default)]
    pub commission: f64,

    /// Flat slippage cost
    #[serde(default)]
    pub slippage: f64,

    /// Flat position fees
    #[serde(default)]
    pub position_fees: f64,

    /// Tax percentage applied to positive net profit only
    #[serde(default)]
    pub tax_rate: f64,

    #[serde(default)]
    pub include_commission: bool,

    #[serde(default)]
    pub include_slippage: bool,

    #[serde(default)]
    pub include_position_fees: bool,

    #[serde(default)]
    pub include_tax: bool,

    /// Absolute stop-loss price; enables the risk metrics
    #[serde(default)]
    pub stop_loss: Option<f64>,

    /// Absolute take-profit price (informational)
    #[serde(default)]
    pub take_profit: Option<f64>,
}

impl TradeInput {
    /// Create a cost-free trade with no stop-loss or take-profit.
    pub fn new(entry_price: f64, exit_price: f64, quantity: f64) -> Self {
        Self {
            entry_price,
            exit_price,
            quantity,
            commission: 0.0,
            slippage: 0.0,
            position_fees: 0.0,
            tax_rate: 0.0,
            include_commission: false,
            include_slippage: false,
            include_position_fees: false,
            include_tax: false,
            stop_loss: None,
            take_profit: None,
        }
    }

    /// Create a trade whose cost amounts and include-flags come from the user's defaults.
    pub fn with_settings(
        entry_price: f64,
        exit_price: f64,
        quantity: f64,
        settings: &Settings,
    ) -> Self {
        Self {
            commission: settings.default_commission,
            slippage: settings.default_slippage,
            position_fees: settings.default_position_fees,
            tax_rate: settings.default_tax_rate,
            include_commission: settings.include_commission,
            include_slippage: settings.include_slippage,
            include_position_fees: settings.include_position_fees,
            include_tax: settings.include_tax,
            ..Self::new(entry_price, exit_price, quantity)
        }
    }

    /// Check that the input produces non-degenerate results.
    ///
    /// The calculator accepts anything; callers run this first so that zero
    /// quantities or prices never turn into NaN/infinite values downstream.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("entry price", self.entry_price),
            ("exit price", self.exit_price),
            ("quantity", self.quantity),
        ] {
            if !value.is_finite() || value <= 0.0 {
                bail!("{} must be a positive number (got {})", name, value);
            }
        }

        for (name, value) in [
            ("commission", self.commission),
            ("slippage", self.slippage),
            ("position fees", self.position_fees),
            ("tax rate", self.tax_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{} must not be negative (got {})", name, value);
            }
        }

        if self.tax_rate > 100.0 {
            bail!("tax rate cannot exceed 100% (got {})", self.tax_rate);
        }

        for (name, value) in [("stop-loss", self.stop_loss), ("take-profit", self.take_profit)] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    bail!("{} must be a positive price (got {})", name, v);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_settings_copies_defaults() {
        let settings = Settings {
            default_commission: 0.25,
            default_slippage: 3.0,
            include_slippage: true,
            ..Default::default()
        };

        let input = TradeInput::with_settings(100.0, 110.0, 5.0, &settings);

        assert_eq!(input.entry_price, 100.0);
        assert_eq!(input.commission, 0.25);
        assert_eq!(input.slippage, 3.0);
        assert!(input.include_commission);
        assert!(input.include_slippage);
        assert!(!input.include_tax);
        assert_eq!(input.stop_loss, None);
    }

    #[test]
    fn test_validate_rejects_non_positive_core_fields() {
        assert!(TradeInput::new(100.0, 110.0, 1.0).validate().is_ok());
        assert!(TradeInput::new(0.0, 110.0, 1.0).validate().is_err());
        assert!(TradeInput::new(100.0, -1.0, 1.0).validate().is_err());
        assert!(TradeInput::new(100.0, 110.0, 0.0).validate().is_err());
        assert!(TradeInput::new(f64::NAN, 110.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_costs() {
        let mut input = TradeInput::new(100.0, 110.0, 1.0);
        input.slippage = -1.0;
        assert!(input.validate().is_err());

        let mut input = TradeInput::new(100.0, 110.0, 1.0);
        input.tax_rate = 150.0;
        assert!(input.validate().is_err());

        let mut input = TradeInput::new(100.0, 110.0, 1.0);
        input.stop_loss = Some(-5.0);
        assert!(input.validate().is_err());
    }
}
