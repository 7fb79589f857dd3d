//! Trade calculator: P&L engine and risk-sizing helpers.

mod engine;
mod risk;

pub use engine::compute;
pub use risk::{derive_stop_loss, derive_take_profit, size_position_by_risk};
