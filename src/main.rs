//! Trade Calculator
//!
//! Computes profit/loss, ROI, break-even price and stop-loss risk for a
//! single trade, keeps a local history of calculations and exports HTML
//! reports.

mod calculator;
mod db;
mod models;
mod report;
mod settings;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crate::calculator::{compute, derive_stop_loss, derive_take_profit, size_position_by_risk};
use crate::db::Database;
use crate::models::{CalculationResult, HistoryRecord, TradeInput};
use crate::report::{
    filter_currencies, find_currency, format_currency, format_percentage, format_ratio,
    format_signed_currency, render_calculation_html, render_history_html, write_report, Currency,
};
use crate::settings::{Settings, SettingsStore};

/// Trade profit/loss and risk calculator CLI.
#[derive(Parser)]
#[command(name = "tradecalc")]
#[command(about = "Profit/loss, ROI, break-even and risk for a single trade", long_about = None)]
struct Cli {
    /// Database file path
    #[arg(
        short,
        long,
        env = "TRADECALC_DATABASE",
        default_value = "sqlite:./tradecalc.db?mode=rwc"
    )]
    database: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TRADECALC_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Cost components that can be switched on or off per calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CostComponent {
    Commission,
    Slippage,
    Fees,
    Tax,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate profit/loss for a trade
    Calc {
        /// Entry price per unit
        entry: f64,

        /// Exit price per unit
        exit: f64,

        /// Units traded
        quantity: f64,

        /// Commission percentage per side (enables commission)
        #[arg(long)]
        commission: Option<f64>,

        /// Flat slippage cost (enables slippage)
        #[arg(long)]
        slippage: Option<f64>,

        /// Flat position fees (enables fees)
        #[arg(long)]
        fees: Option<f64>,

        /// Tax percentage on profit (enables tax)
        #[arg(long)]
        tax_rate: Option<f64>,

        /// Cost components to include on top of the settings defaults
        #[arg(long, value_enum)]
        include: Vec<CostComponent>,

        /// Cost components to leave out
        #[arg(long, value_enum)]
        exclude: Vec<CostComponent>,

        /// Stop-loss price (enables risk metrics)
        #[arg(long)]
        stop_loss: Option<f64>,

        /// Take-profit price
        #[arg(long)]
        take_profit: Option<f64>,

        /// Notes stored with the calculation
        #[arg(long)]
        notes: Option<String>,

        /// Save the calculation to history
        #[arg(long)]
        save: bool,
    },

    /// Units to buy so that hitting the stop risks a share of the account
    Size {
        /// Account size
        account: f64,

        /// Percentage of the account to risk
        risk_pct: f64,

        /// Entry price per unit
        entry: f64,

        /// Stop-loss price
        stop_loss: f64,
    },

    /// Stop-loss price a given percentage below entry
    StopLoss {
        /// Entry price per unit
        entry: f64,

        /// Percentage risked below entry
        risk_pct: f64,

        /// Also derive a take-profit at this reward multiple
        #[arg(long)]
        reward_ratio: Option<f64>,
    },

    /// Take-profit price for a reward multiple of the stop distance
    TakeProfit {
        /// Entry price per unit
        entry: f64,

        /// Stop-loss price
        stop_loss: f64,

        /// Reward multiple of the risk
        ratio: f64,
    },

    /// Manage saved calculations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Export saved calculations as an HTML report
    Export {
        /// Record id (or unique prefix)
        id: Option<String>,

        /// Export the whole history instead of one record
        #[arg(long, conflicts_with = "id")]
        all: bool,

        /// Output file
        #[arg(short, long, default_value = "trade-report.html")]
        output: PathBuf,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// List supported display currencies
    Currencies {
        /// Filter by code or name
        query: Option<String>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved calculations, newest first
    List,

    /// Show one saved calculation
    Show {
        /// Record id (or unique prefix)
        id: String,
    },

    /// Delete one saved calculation
    Delete {
        /// Record id (or unique prefix)
        id: String,
    },

    /// Delete all saved calculations
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings
    Show,

    /// Change one setting
    Set { key: String, value: String },

    /// Restore defaults
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let db = Database::new(&cli.database).await?;
    let store = SettingsStore::new(&db);
    let settings = store.load().await?;
    let currency = display_currency(&settings)?;

    match cli.command {
        Commands::Calc {
            entry,
            exit,
            quantity,
            commission,
            slippage,
            fees,
            tax_rate,
            include,
            exclude,
            stop_loss,
            take_profit,
            notes,
            save,
        } => {
            let mut input = TradeInput::with_settings(entry, exit, quantity, &settings);
            if let Some(c) = commission {
                input.commission = c;
                input.include_commission = true;
            }
            if let Some(s) = slippage {
                input.slippage = s;
                input.include_slippage = true;
            }
            if let Some(f) = fees {
                input.position_fees = f;
                input.include_position_fees = true;
            }
            if let Some(t) = tax_rate {
                input.tax_rate = t;
                input.include_tax = true;
            }
            for component in include {
                set_included(&mut input, component, true);
            }
            for component in exclude {
                set_included(&mut input, component, false);
            }
            input.stop_loss = stop_loss;
            input.take_profit = take_profit;

            input.validate()?;
            let result = compute(&input);

            print_calculation(&input, &result, currency);

            if save {
                let record = HistoryRecord::new(input, result, notes);
                db.append_history(&record).await?;
                info!(id = %record.id, "Calculation saved");
                println!("\nSaved as {}", record.short_id());
            } else if notes.is_some() {
                warn!("Notes are only kept with --save");
            }
        }

        Commands::Size {
            account,
            risk_pct,
            entry,
            stop_loss,
        } => {
            require_positive(&[
                ("account", account),
                ("risk percentage", risk_pct),
                ("entry", entry),
            ])?;

            let units = size_position_by_risk(account, risk_pct, entry, stop_loss);
            let risk_amount = account * risk_pct / 100.0;

            println!("\n=== Position Size ===");
            println!("Risk Amount:    {}", format_currency(risk_amount, currency));
            println!("Stop Distance:  {}", format_currency((entry - stop_loss).abs(), currency));
            println!("Units:          {:.4}", units);
            println!("Position Value: {}", format_currency(units * entry, currency));
            if units == 0.0 {
                println!("\nNo size: the stop-loss must be set and differ from the entry price.");
            }
        }

        Commands::StopLoss {
            entry,
            risk_pct,
            reward_ratio,
        } => {
            require_positive(&[("entry", entry)])?;

            let stop = derive_stop_loss(entry, risk_pct);
            println!("\n=== Stop-Loss ===");
            println!("Entry:       {}", format_currency(entry, currency));
            println!(
                "Stop-Loss:   {} (-{})",
                format_currency(stop, currency),
                format_percentage(risk_pct)
            );

            if let Some(ratio) = reward_ratio {
                let target = derive_take_profit(entry, stop, ratio);
                println!(
                    "Take-Profit: {} ({})",
                    format_currency(target, currency),
                    format_ratio(ratio)
                );
            }
        }

        Commands::TakeProfit {
            entry,
            stop_loss,
            ratio,
        } => {
            require_positive(&[("entry", entry), ("stop-loss", stop_loss)])?;

            let target = derive_take_profit(entry, stop_loss, ratio);
            println!("\n=== Take-Profit ===");
            println!("Entry:       {}", format_currency(entry, currency));
            println!("Stop-Loss:   {}", format_currency(stop_loss, currency));
            println!("Risk/Reward: {}", format_ratio(ratio));
            println!("Take-Profit: {}", format_currency(target, currency));
        }

        Commands::History { action } => match action {
            HistoryAction::List => {
                let records = db.list_history().await?;

                if records.is_empty() {
                    println!("No saved calculations. Use 'tradecalc calc ... --save' to add one.");
                    return Ok(());
                }

                println!(
                    "\n{:<10} {:<17} {:>12} {:>12} {:>10} {:>14} {:>9}  {}",
                    "ID", "DATE", "ENTRY", "EXIT", "QTY", "NET P&L", "ROI", "NOTES"
                );
                println!("{}", "-".repeat(100));

                for record in &records {
                    println!(
                        "{:<10} {:<17} {:>12} {:>12} {:>10} {:>14} {:>9}  {}",
                        record.short_id(),
                        record.created_at.format("%Y-%m-%d %H:%M"),
                        format_currency(record.input.entry_price, currency),
                        format_currency(record.input.exit_price, currency),
                        record.input.quantity,
                        format_signed_currency(record.result.net_profit_loss, currency),
                        format_percentage(record.result.profit_loss_percentage),
                        truncate(record.notes.as_deref().unwrap_or(""), 24)
                    );
                }
            }

            HistoryAction::Show { id } => {
                let record = find_record(&db, &id).await?;

                println!("\n=== Calculation {} ===", record.id);
                println!("Saved: {}", record.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
                if let Some(notes) = &record.notes {
                    println!("Notes: {}", notes);
                }
                print_calculation(&record.input, &record.result, currency);
            }

            HistoryAction::Delete { id } => {
                let record = find_record(&db, &id).await?;
                db.delete_history(&record.id).await?;
                info!(id = %record.id, "History record deleted");
                println!("Deleted {}", record.short_id());
            }

            HistoryAction::Clear { yes } => {
                if !yes {
                    println!("This deletes every saved calculation. Re-run with --yes to confirm.");
                    return Ok(());
                }
                let removed = db.clear_history().await?;
                info!(removed = removed, "History cleared");
                println!("Removed {} saved calculation(s)", removed);
            }
        },

        Commands::Export { id, all, output } => {
            let html = if all {
                let records = db.list_history().await?;
                render_history_html(&records, currency, settings.theme)
            } else {
                let id = id.ok_or_else(|| anyhow!("Specify a record id or use --all"))?;
                let record = find_record(&db, &id).await?;
                render_calculation_html(&record, currency, settings.theme)
            };

            write_report(&output, &html)?;
            println!("Report written to {}", output.display());
        }

        Commands::Settings { action } => match action.unwrap_or(SettingsAction::Show) {
            SettingsAction::Show => print_settings(&settings),

            SettingsAction::Set { key, value } => {
                let updated = store.update(&key, &value).await?;
                info!(key = %key, "Setting saved");
                print_settings(&updated);
            }

            SettingsAction::Reset => {
                store.reset().await?;
                info!("Settings reset to defaults");
                print_settings(&Settings::default());
            }
        },

        Commands::Currencies { query } => {
            let matches = filter_currencies(query.as_deref().unwrap_or(""));

            if matches.is_empty() {
                println!("No currency matches that query.");
                return Ok(());
            }

            println!("\n{:<6} {:<6} {}", "CODE", "SYMBOL", "NAME");
            println!("{}", "-".repeat(40));
            for c in matches {
                let marker = if c.code == currency.code { " *" } else { "" };
                println!("{:<6} {:<6} {}{}", c.code, c.symbol.trim(), c.name, marker);
            }
        }
    }

    Ok(())
}

/// Currency from settings, falling back to USD for codes no longer known.
fn display_currency(settings: &Settings) -> Result<&'static Currency> {
    find_currency(&settings.currency)
        .or_else(|| {
            warn!(currency = %settings.currency, "Unknown currency in settings, using USD");
            find_currency("USD")
        })
        .ok_or_else(|| anyhow!("No usable display currency"))
}

fn set_included(input: &mut TradeInput, component: CostComponent, included: bool) {
    match component {
        CostComponent::Commission => input.include_commission = included,
        CostComponent::Slippage => input.include_slippage = included,
        CostComponent::Fees => input.include_position_fees = included,
        CostComponent::Tax => input.include_tax = included,
    }
}

fn require_positive(values: &[(&str, f64)]) -> Result<()> {
    for (name, value) in values {
        if !value.is_finite() || *value <= 0.0 {
            bail!("{} must be a positive number (got {})", name, value);
        }
    }
    Ok(())
}

async fn find_record(db: &Database, id: &str) -> Result<HistoryRecord> {
    db.get_history(id)
        .await?
        .ok_or_else(|| anyhow!("No saved calculation with id '{}'", id))
}

fn print_calculation(input: &TradeInput, result: &CalculationResult, currency: &Currency) {
    let money = |v: f64| format_currency(v, currency);
    let flag = |on: bool| if on { "" } else { " (excluded)" };

    println!("\n--- Trade ---");
    println!("Entry Price:      {}", money(input.entry_price));
    println!("Exit Price:       {}", money(input.exit_price));
    println!("Quantity:         {}", input.quantity);
    println!("Position Value:   {}", money(result.position_value));
    println!("Exit Value:       {}", money(result.exit_value));

    println!("\n--- Costs ---");
    println!(
        "Commission:       {} @ {}%{}",
        money(result.commission_cost),
        input.commission,
        flag(input.include_commission)
    );
    println!("Slippage:         {}{}", money(result.slippage_cost), flag(input.include_slippage));
    println!("Position Fees:    {}{}", money(result.fees_cost), flag(input.include_position_fees));
    println!("Tax Rate:         {}%{}", input.tax_rate, flag(input.include_tax));
    println!("Total Costs:      {}", money(result.total_costs));

    println!("\n--- Result ---");
    println!("Gross P&L:        {}", format_signed_currency(result.raw_profit_loss, currency));
    println!("Net P&L:          {}", format_signed_currency(result.net_profit_loss, currency));
    println!("ROI:              {}", format_percentage(result.profit_loss_percentage));
    println!("Break-Even Price: {}", money(result.break_even_price));
    println!("Required Move:    {}", money(result.required_price_movement));

    if let Some(potential_loss) = result.potential_loss {
        println!("\n--- Risk ---");
        println!("Potential Loss:   {}", money(potential_loss));
        println!(
            "Risk/Reward:      {}",
            result
                .risk_reward_ratio
                .map(format_ratio)
                .unwrap_or_else(|| "N/A".to_string())
        );
        if let Some(dd) = result.max_drawdown {
            println!("Max Drawdown:     {}", format_percentage(dd));
        }
    }
    if let Some(tp) = input.take_profit {
        println!("Take-Profit:      {}", money(tp));
    }
}

fn print_settings(settings: &Settings) {
    println!("\n=== Settings ===\n");
    for key in Settings::keys() {
        println!("  {:<24} {}", key, settings.get(key).unwrap_or_default());
    }
}

/// Truncate a string with ellipsis if too long.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_component_flags_parse() {
        let cli = Cli::try_parse_from([
            "tradecalc", "calc", "100", "150", "10", "--include", "tax", "--include", "slippage",
            "--exclude", "fees",
        ])
        .unwrap();

        match cli.command {
            Commands::Calc { include, exclude, .. } => {
                assert_eq!(include, vec![CostComponent::Tax, CostComponent::Slippage]);
                assert_eq!(exclude, vec![CostComponent::Fees]);
            }
            _ => panic!("expected calc"),
        }
        assert!(Cli::try_parse_from(["tradecalc", "calc", "1", "2", "3", "--include", "rent"]).is_err());
    }

    #[test]
    fn test_set_included_toggles_one_component() {
        let mut input = TradeInput::new(100.0, 150.0, 10.0);
        set_included(&mut input, CostComponent::Fees, true);
        set_included(&mut input, CostComponent::Tax, true);
        set_included(&mut input, CostComponent::Tax, false);

        assert!(input.include_position_fees);
        assert!(!input.include_tax);
        assert!(!input.include_commission);
        assert!(!input.include_slippage);
    }
}
