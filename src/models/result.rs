//! Derived figures for a single trade.

use serde::{Deserialize, Serialize};

/// Output of the calculator for one [`TradeInput`](super::TradeInput).
///
/// Values may be NaN or infinite when the input had a zero entry price or
/// quantity; the calculator does not guard against that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Entry price × quantity
    pub position_value: f64,

    /// Exit price × quantity
    pub exit_value: f64,

    /// Exit value minus position value, before any cost
    pub raw_profit_loss: f64,

    // === Cost breakdown ===
    pub commission_cost: f64,
    pub slippage_cost: f64,
    pub fees_cost: f64,

    /// Sum of all included cost components
    pub total_costs: f64,

    /// Raw P&L minus costs, minus tax when positive and taxed
    pub net_profit_loss: f64,

    /// Net P&L as a percentage of position value (ROI)
    pub profit_loss_percentage: f64,

    /// Exit price at which net P&L is zero under the same costs
    pub break_even_price: f64,

    /// Distance from entry to break-even
    pub required_price_movement: f64,

    // === Risk metrics (only with a stop-loss) ===
    /// Loss if the stop-loss is hit
    #[serde(default)]
    pub potential_loss: Option<f64>,

    /// Realized gain divided by potential loss
    #[serde(default)]
    pub risk_reward_ratio: Option<f64>,

    /// Percentage drop from entry to stop-loss
    #[serde(default)]
    pub max_drawdown: Option<f64>,
}

impl CalculationResult {
    /// Whether the trade ended with a positive net result.
    pub fn is_profitable(&self) -> bool {
        self.net_profit_loss > 0.0
    }

    /// False if any figure is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        [
            self.position_value,
            self.exit_value,
            self.raw_profit_loss,
            self.commission_cost,
            self.slippage_cost,
            self.fees_cost,
            self.total_costs,
            self.net_profit_loss,
            self.profit_loss_percentage,
            self.break_even_price,
            self.required_price_movement,
        ]
        .into_iter()
        .chain(self.potential_loss)
        .chain(self.risk_reward_ratio)
        .chain(self.max_drawdown)
        .all(f64::is_finite)
    }
}
