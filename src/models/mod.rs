//! Data models for trade inputs, calculation results and saved history.

mod history;
mod result;
mod trade_input;

pub use history::HistoryRecord;
pub use result::CalculationResult;
pub use trade_input::TradeInput;
