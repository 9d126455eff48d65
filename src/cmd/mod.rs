pub mod balance;
pub mod brackets;
pub mod dashboard;
pub mod income_tax;
pub mod obligations;
pub mod overview;
pub mod schema;

use chrono::{Local, NaiveDate};
use clap::Args;
use microtax::core::{BracketTable, Money};
use microtax::input::{load_ledger, Ledger};
use std::path::PathBuf;

/// Where to read the ledger snapshot from
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// JSON ledger snapshot, or "-" for stdin
    #[arg(short, long)]
    input: PathBuf,

    /// CSV file of invoices added to those in the snapshot
    #[arg(long)]
    invoices: Option<PathBuf>,
}

impl LedgerArgs {
    pub fn load(&self) -> anyhow::Result<Ledger> {
        load_ledger(&self.input, self.invoices.as_deref())
    }
}

/// `as_of` if given, today otherwise.
pub fn as_of_or_today(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| Local::now().date_naive())
}

pub fn format_eur(amount: Money) -> String {
    if amount.is_negative() {
        format!("-€{}", amount.to_decimal().abs())
    } else {
        format!("€{}", amount)
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Context for a failed bracket lookup, naming the years that do exist.
pub fn configured_years(table: &BracketTable) -> String {
    let years: Vec<String> = table.years().iter().map(ToString::to_string).collect();
    if years.is_empty() {
        "No tax brackets are configured".to_string()
    } else {
        format!("Tax brackets are configured for {}", years.join(", "))
    }
}
