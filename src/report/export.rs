//! HTML reports for a single calculation or the saved history.
//!
//! Output is a self-contained document suitable for printing to PDF.

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::{format_currency, format_percentage, format_ratio, format_signed_currency, Currency};
use crate::models::HistoryRecord;
use crate::settings::Theme;

const EMPTY_CELL: &str = "—";

const LIGHT_CSS: &str = "body{background:#fff;color:#1b1f24}th{background:#f0f2f5}.gain{color:#137333}.loss{color:#c5221f}";
const DARK_CSS: &str = "body{background:#121417;color:#e8eaed}th{background:#24282e}.gain{color:#81c995}.loss{color:#f28b82}";
const BASE_CSS: &str = "body{font-family:-apple-system,Helvetica,Arial,sans-serif;margin:32px}table{border-collapse:collapse;width:100%;margin-bottom:24px}th,td{padding:6px 10px;border-bottom:1px solid #8884;text-align:left}td.num{text-align:right}h1{font-size:22px}h2{font-size:16px;margin-top:28px}.meta{opacity:.7;font-size:12px}";

/// Render one saved calculation.
pub fn render_calculation_html(record: &HistoryRecord, currency: &Currency, theme: Theme) -> String {
    let body = CalculationReport { record, currency }.to_string();
    document("Trade Calculation Report", theme, &body)
}

/// Render the saved history as one table, newest first as given.
pub fn render_history_html(records: &[HistoryRecord], currency: &Currency, theme: Theme) -> String {
    let body = HistoryReport { records, currency }.to_string();
    document("Calculation History", theme, &body)
}

struct CalculationReport<'a> {
    record: &'a HistoryRecord,
    currency: &'a Currency,
}

impl fmt::Display for CalculationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        let currency = self.currency;
        let input = &record.input;
        let result = &record.result;
        let money = |v: f64| format_currency(v, currency);

        writeln!(f, "<h1>Trade Calculation Report</h1>")?;
        writeln!(
            f,
            "<p class=\"meta\">Record {} &middot; {} &middot; {}</p>",
            escape(&record.id),
            record.created_at.format("%Y-%m-%d %H:%M UTC"),
            currency.code
        )?;

        writeln!(f, "<h2>Trade</h2>")?;
        write_table(
            f,
            &[
                ("Entry Price", money(input.entry_price)),
                ("Exit Price", money(input.exit_price)),
                ("Quantity", format!("{}", input.quantity)),
                ("Stop-Loss", optional(input.stop_loss.filter(|s| *s != 0.0).map(money))),
                ("Take-Profit", optional(input.take_profit.map(money))),
            ],
        )?;

        writeln!(f, "<h2>Costs</h2>")?;
        write_table(
            f,
            &[
                (
                    "Commission",
                    included(input.include_commission, || {
                        format!("{} ({}%)", money(result.commission_cost), input.commission)
                    }),
                ),
                ("Slippage", included(input.include_slippage, || money(result.slippage_cost))),
                ("Position Fees", included(input.include_position_fees, || money(result.fees_cost))),
                ("Tax Rate", included(input.include_tax, || format!("{}%", input.tax_rate))),
                ("Total Costs", money(result.total_costs)),
            ],
        )?;

        let pnl_class = if result.is_profitable() { "gain" } else { "loss" };
        writeln!(f, "<h2>Results</h2>")?;
        write_table(
            f,
            &[
                ("Position Value", money(result.position_value)),
                ("Exit Value", money(result.exit_value)),
                ("Gross P&amp;L", format_signed_currency(result.raw_profit_loss, currency)),
                (
                    "Net P&amp;L",
                    format!(
                        "<span class=\"{}\">{}</span>",
                        pnl_class,
                        format_signed_currency(result.net_profit_loss, currency)
                    ),
                ),
                ("ROI", format_percentage(result.profit_loss_percentage)),
                ("Break-Even Price", money(result.break_even_price)),
                ("Required Move", money(result.required_price_movement)),
            ],
        )?;

        writeln!(f, "<h2>Risk</h2>")?;
        write_table(
            f,
            &[
                ("Potential Loss", optional(result.potential_loss.map(money))),
                ("Risk/Reward", optional(result.risk_reward_ratio.map(format_ratio))),
                ("Max Drawdown", optional(result.max_drawdown.map(format_percentage))),
            ],
        )?;

        if let Some(notes) = &record.notes {
            writeln!(f, "<h2>Notes</h2>")?;
            writeln!(f, "<p>{}</p>", escape(notes).replace('\n', "<br>"))?;
        }

        Ok(())
    }
}

struct HistoryReport<'a> {
    records: &'a [HistoryRecord],
    currency: &'a Currency,
}

impl fmt::Display for HistoryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let currency = self.currency;

        writeln!(f, "<h1>Calculation History</h1>")?;
        writeln!(
            f,
            "<p class=\"meta\">{} saved calculation(s) &middot; {}</p>",
            self.records.len(),
            currency.code
        )?;

        if self.records.is_empty() {
            return writeln!(f, "<p>No saved calculations.</p>");
        }

        writeln!(f, "<table>\n<tr><th>Date</th><th>Entry</th><th>Exit</th><th>Qty</th><th>Net P&amp;L</th><th>ROI</th><th>Break-Even</th><th>R/R</th><th>Notes</th></tr>")?;
        for record in self.records {
            let r = &record.result;
            let class = if r.is_profitable() { "gain" } else { "loss" };
            writeln!(
                f,
                "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num {}\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td>{}</td></tr>",
                record.created_at.format("%Y-%m-%d %H:%M"),
                format_currency(record.input.entry_price, currency),
                format_currency(record.input.exit_price, currency),
                record.input.quantity,
                class,
                format_signed_currency(r.net_profit_loss, currency),
                format_percentage(r.profit_loss_percentage),
                format_currency(r.break_even_price, currency),
                optional(r.risk_reward_ratio.map(format_ratio)),
                record.notes.as_deref().map(escape).unwrap_or_default(),
            )?;
        }
        writeln!(f, "</table>")
    }
}

/// Write a rendered report, creating parent directories.
pub fn write_report(path: impl AsRef<Path>, html: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), bytes = html.len(), "Report written");
    Ok(())
}

fn document(title: &str, theme: Theme, body: &str) -> String {
    let theme_css = match theme {
        Theme::Light => LIGHT_CSS.to_string(),
        Theme::Dark => DARK_CSS.to_string(),
        Theme::System => format!("{}@media (prefers-color-scheme: dark){{{}}}", LIGHT_CSS, DARK_CSS),
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{}{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        title, BASE_CSS, theme_css, body
    )
}

fn write_table(f: &mut fmt::Formatter<'_>, rows: &[(&str, String)]) -> fmt::Result {
    writeln!(f, "<table>")?;
    for (label, value) in rows {
        writeln!(f, "<tr><th>{}</th><td class=\"num\">{}</td></tr>", label, value)?;
    }
    writeln!(f, "</table>")
}

fn optional(value: Option<String>) -> String {
    value.unwrap_or_else(|| EMPTY_CELL.to_string())
}

fn included(flag: bool, render: impl FnOnce() -> String) -> String {
    if flag {
        render()
    } else {
        "not included".to_string()
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::compute;
    use crate::models::TradeInput;
    use crate::report::find_currency;

    fn sample(notes: Option<&str>, stop_loss: Option<f64>) -> HistoryRecord {
        let input = TradeInput {
            commission: 0.1,
            include_commission: true,
            stop_loss,
            ..TradeInput::new(100.0, 150.0, 10.0)
        };
        let result = compute(&input);
        HistoryRecord::new(input, result, notes.map(str::to_string))
    }

    #[test]
    fn test_calculation_report_contents() {
        let usd = find_currency("USD").unwrap();
        let html = render_calculation_html(&sample(None, Some(90.0)), usd, Theme::Light);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("$1,000.00"));
        assert!(html.contains("+$497.50"));
        assert!(html.contains("49.75%"));
        assert!(html.contains("$100.25"));
        assert!(html.contains("10.00%"));
        assert!(html.contains("$2.50 (0.1%)"));
        assert!(html.contains("not included"));
        assert!(!html.contains("prefers-color-scheme"));
    }

    #[test]
    fn test_calculation_sections_in_order() {
        let usd = find_currency("USD").unwrap();
        let body = CalculationReport {
            record: &sample(Some("note"), Some(90.0)),
            currency: usd,
        }
        .to_string();

        let headings = ["Trade", "Costs", "Results", "Risk", "Notes"];
        let positions: Vec<usize> = headings
            .iter()
            .map(|h| format!("<h2>{}</h2>", h))
            .map(|heading| body.find(&heading).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(body.matches("<table>").count(), 4);
        assert_eq!(body.matches("</table>").count(), 4);
    }

    #[test]
    fn test_missing_risk_metrics_render_as_dash() {
        let usd = find_currency("USD").unwrap();
        let html = render_calculation_html(&sample(None, None), usd, Theme::Dark);

        assert!(html.contains(&format!("<tr><th>Risk/Reward</th><td class=\"num\">{}</td></tr>", EMPTY_CELL)));
        assert!(html.contains("#121417"));
    }

    #[test]
    fn test_notes_are_escaped() {
        let usd = find_currency("USD").unwrap();
        let html = render_calculation_html(
            &sample(Some("<script>alert(1)</script> & more"), None),
            usd,
            Theme::System,
        );

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; more"));
        assert!(html.contains("prefers-color-scheme"));
    }

    #[test]
    fn test_history_report_rows() {
        let eur = find_currency("EUR").unwrap();
        let records = vec![sample(Some("a"), Some(90.0)), sample(None, None)];
        let html = render_history_html(&records, eur, Theme::Light);

        assert_eq!(html.matches("<tr><td>").count(), 2);
        assert!(html.contains("€100.00"));
        assert!(html.contains("2 saved calculation(s)"));
    }

    #[test]
    fn test_empty_history_report() {
        let usd = find_currency("USD").unwrap();
        let html = render_history_html(&[], usd, Theme::Light);
        assert!(html.contains("No saved calculations."));
    }

    #[test]
    fn test_write_report_creates_directories() {
        let dir = std::env::temp_dir().join(format!("tradecalc-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("report.html");

        write_report(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");

        fs::remove_dir_all(&dir).unwrap();
    }
}
