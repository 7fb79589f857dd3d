//! Profit/loss calculator: costs, net P&L, ROI, break-even and stop-loss risk.

use crate::models::{CalculationResult, TradeInput};

/// Evaluate a single trade.
///
/// Commission is charged on both entry and exit notional. Slippage and
/// position fees are flat amounts. Tax only reduces a positive net result.
/// Risk metrics are filled in only when a stop-loss other than zero or NaN
/// is present.
///
/// Total over all inputs: a zero entry price or quantity yields NaN or
/// infinite figures instead of an error.
pub fn compute(trade: &TradeInput) -> CalculationResult {
    let position_value = trade.entry_price * trade.quantity;
    let exit_value = trade.exit_price * trade.quantity;
    let raw_profit_loss = exit_value - position_value;

    let commission_cost = if trade.include_commission {
        let rate = trade.commission / 100.0;
        position_value * rate + exit_value * rate
    } else {
        0.0
    };
    let slippage_cost = if trade.include_slippage {
        trade.slippage
    } else {
        0.0
    };
    let fees_cost = if trade.include_position_fees {
        trade.position_fees
    } else {
        0.0
    };
    let total_costs = commission_cost + slippage_cost + fees_cost;

    let mut net_profit_loss = raw_profit_loss - total_costs;
    if trade.include_tax && net_profit_loss > 0.0 {
        net_profit_loss -= net_profit_loss * (trade.tax_rate / 100.0);
    }

    let profit_loss_percentage = (net_profit_loss / position_value) * 100.0;
    let break_even_price = trade.entry_price + total_costs / trade.quantity;
    let required_price_movement = break_even_price - trade.entry_price;

    let (potential_loss, risk_reward_ratio, max_drawdown) = match active_stop_loss(trade) {
        Some(stop_loss) => {
            let potential_loss = ((trade.entry_price - stop_loss) * trade.quantity).abs();
            // Gain side is the realized net result, not the take-profit target.
            let potential_gain = if net_profit_loss > 0.0 {
                net_profit_loss
            } else {
                0.0
            };
            let ratio = if potential_loss > 0.0 {
                Some(potential_gain / potential_loss)
            } else {
                None
            };
            let drawdown = ((trade.entry_price - stop_loss) / trade.entry_price) * 100.0;
            (Some(potential_loss), ratio, Some(drawdown))
        }
        None => (None, None, None),
    };

    CalculationResult {
        position_value,
        exit_value,
        raw_profit_loss,
        commission_cost,
        slippage_cost,
        fees_cost,
        total_costs,
        net_profit_loss,
        profit_loss_percentage,
        break_even_price,
        required_price_movement,
        potential_loss,
        risk_reward_ratio,
        max_drawdown,
    }
}

/// Stop-loss if set; zero and NaN count as unset.
fn active_stop_loss(trade: &TradeInput) -> Option<f64> {
    trade.stop_loss.filter(|s| *s != 0.0 && !s.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn commission_trade() -> TradeInput {
        TradeInput {
            commission: 0.1,
            include_commission: true,
            stop_loss: Some(90.0),
            ..TradeInput::new(100.0, 150.0, 10.0)
        }
    }

    #[test]
    fn test_end_to_end_with_commission_and_stop_loss() {
        let r = compute(&commission_trade());

        assert_close(r.position_value, 1000.0);
        assert_close(r.exit_value, 1500.0);
        assert_close(r.raw_profit_loss, 500.0);
        assert_close(r.commission_cost, 2.5);
        assert_close(r.total_costs, 2.5);
        assert_close(r.net_profit_loss, 497.5);
        assert_close(r.profit_loss_percentage, 49.75);
        assert_close(r.break_even_price, 100.25);
        assert_close(r.required_price_movement, 0.25);
        assert_close(r.potential_loss.unwrap(), 100.0);
        assert_close(r.risk_reward_ratio.unwrap(), 4.975);
        assert_close(r.max_drawdown.unwrap(), 10.0);
        assert!(r.is_profitable());
    }

    #[test]
    fn test_no_costs_is_pure_price_move() {
        let r = compute(&TradeInput::new(100.0, 150.0, 10.0));

        assert_eq!(r.net_profit_loss, (150.0 - 100.0) * 10.0);
        assert_eq!(r.total_costs, 0.0);
        assert_eq!(r.break_even_price, 100.0);
        assert_eq!(r.potential_loss, None);
        assert_eq!(r.risk_reward_ratio, None);
        assert_eq!(r.max_drawdown, None);
    }

    #[test]
    fn test_costs_are_ignored_when_flags_off() {
        let input = TradeInput {
            commission: 1.0,
            slippage: 5.0,
            position_fees: 7.0,
            tax_rate: 30.0,
            ..TradeInput::new(20.0, 25.0, 4.0)
        };
        let r = compute(&input);

        assert_eq!(r.commission_cost, 0.0);
        assert_eq!(r.slippage_cost, 0.0);
        assert_eq!(r.fees_cost, 0.0);
        assert_eq!(r.net_profit_loss, 20.0);
    }

    #[test]
    fn test_flat_costs_are_not_scaled_by_quantity() {
        let input = TradeInput {
            slippage: 5.0,
            position_fees: 3.0,
            include_slippage: true,
            include_position_fees: true,
            ..TradeInput::new(50.0, 60.0, 100.0)
        };
        let r = compute(&input);

        assert_close(r.slippage_cost, 5.0);
        assert_close(r.fees_cost, 3.0);
        assert_close(r.total_costs, 8.0);
        assert_close(r.net_profit_loss, 992.0);
        assert_close(r.break_even_price, 50.08);
    }

    #[test]
    fn test_tax_applies_to_profit_only() {
        let profit = TradeInput {
            tax_rate: 20.0,
            include_tax: true,
            ..TradeInput::new(100.0, 110.0, 10.0)
        };
        assert_close(compute(&profit).net_profit_loss, 80.0);

        let loss = TradeInput {
            tax_rate: 20.0,
            include_tax: true,
            ..TradeInput::new(100.0, 90.0, 10.0)
        };
        let untaxed = TradeInput {
            include_tax: false,
            ..loss.clone()
        };
        assert_eq!(
            compute(&loss).net_profit_loss,
            compute(&untaxed).net_profit_loss
        );
        assert_close(compute(&loss).net_profit_loss, -100.0);
    }

    #[test]
    fn test_costs_can_turn_profit_into_taxless_loss() {
        let input = TradeInput {
            position_fees: 15.0,
            include_position_fees: true,
            tax_rate: 50.0,
            include_tax: true,
            ..TradeInput::new(100.0, 101.0, 10.0)
        };
        let r = compute(&input);

        assert_close(r.net_profit_loss, -5.0);
        assert!(!r.is_profitable());
    }

    #[test]
    fn test_commission_is_linear() {
        let base = commission_trade();
        let doubled = TradeInput {
            commission: base.commission * 2.0,
            ..base.clone()
        };

        assert_close(
            compute(&doubled).commission_cost,
            compute(&base).commission_cost * 2.0,
        );
    }

    #[test]
    fn test_break_even_offset_equals_costs_per_unit() {
        let input = TradeInput {
            commission: 0.3,
            slippage: 2.0,
            position_fees: 1.5,
            include_commission: true,
            include_slippage: true,
            include_position_fees: true,
            ..TradeInput::new(42.0, 40.0, 7.0)
        };
        let r = compute(&input);

        assert_close(r.break_even_price - input.entry_price, r.total_costs / input.quantity);
        assert_close(r.required_price_movement, r.total_costs / input.quantity);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let input = commission_trade();
        assert_eq!(compute(&input), compute(&input));
    }

    #[test]
    fn test_losing_trade_has_zero_reward() {
        let input = TradeInput {
            stop_loss: Some(95.0),
            ..TradeInput::new(100.0, 97.0, 10.0)
        };
        let r = compute(&input);

        assert_close(r.potential_loss.unwrap(), 50.0);
        assert_eq!(r.risk_reward_ratio, Some(0.0));
        assert_close(r.max_drawdown.unwrap(), 5.0);
    }

    #[test]
    fn test_stop_loss_at_entry_has_no_ratio() {
        let input = TradeInput {
            stop_loss: Some(100.0),
            ..TradeInput::new(100.0, 120.0, 1.0)
        };
        let r = compute(&input);

        assert_eq!(r.potential_loss, Some(0.0));
        assert_eq!(r.risk_reward_ratio, None);
        assert_eq!(r.max_drawdown, Some(0.0));
    }

    #[test]
    fn test_zero_stop_loss_is_unset() {
        let input = TradeInput {
            stop_loss: Some(0.0),
            ..TradeInput::new(100.0, 120.0, 1.0)
        };
        let r = compute(&input);

        assert_eq!(r.risk_reward_ratio, None);
        assert_eq!(r.max_drawdown, None);
    }

    #[test]
    fn test_nan_stop_loss_is_unset() {
        let input = TradeInput {
            stop_loss: Some(f64::NAN),
            ..TradeInput::new(100.0, 150.0, 10.0)
        };
        let r = compute(&input);

        assert_eq!(r.potential_loss, None);
        assert_eq!(r.risk_reward_ratio, None);
        assert_eq!(r.max_drawdown, None);
        assert_eq!(r.net_profit_loss, 500.0);
    }

    #[test]
    fn test_stop_loss_above_entry_gives_negative_drawdown() {
        let input = TradeInput {
            stop_loss: Some(110.0),
            ..TradeInput::new(100.0, 120.0, 2.0)
        };
        let r = compute(&input);

        assert_close(r.potential_loss.unwrap(), 20.0);
        assert_close(r.risk_reward_ratio.unwrap(), 2.0);
        assert_close(r.max_drawdown.unwrap(), -10.0);
    }

    #[test]
    fn test_take_profit_does_not_affect_result() {
        let with_target = TradeInput {
            take_profit: Some(200.0),
            ..commission_trade()
        };
        assert_eq!(compute(&with_target), compute(&commission_trade()));
    }

    #[test]
    fn test_zero_quantity_degrades_without_panicking() {
        let input = TradeInput {
            slippage: 1.0,
            include_slippage: true,
            ..TradeInput::new(100.0, 110.0, 0.0)
        };
        let r = compute(&input);

        assert_eq!(r.position_value, 0.0);
        assert!(!r.profit_loss_percentage.is_finite());
        assert!(r.break_even_price.is_infinite());
    }

    #[test]
    fn test_zero_entry_price_yields_nan_percentage() {
        let r = compute(&TradeInput::new(0.0, 0.0, 5.0));
        assert!(r.profit_loss_percentage.is_nan());
    }
}
