//! Presentation: currencies, number formatting and HTML export.

mod currency;
mod export;
mod format;

pub use currency::{filter_currencies, find_currency, Currency};
pub use export::{render_calculation_html, render_history_html, write_report};
pub use format::{format_currency, format_percentage, format_ratio, format_signed_currency};
