//! Income tax command - yearly estimate under the flat-deduction regime

use super::brackets::BracketRow;
use super::{as_of_or_today, configured_years, format_eur, print_json, LedgerArgs};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use microtax::core::{
    aggregate, compose_income_tax_summary, totals_for_period, DateRange, IncomeTaxSummary,
    ObligationKind,
};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

#[derive(Args, Debug)]
pub struct IncomeTaxCommand {
    #[command(flatten)]
    ledger: LedgerArgs,

    /// Calendar year to estimate
    #[arg(short, long)]
    year: i32,

    /// Date used to evaluate obligations (defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl IncomeTaxCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = self.ledger.load()?;
        let as_of = as_of_or_today(self.as_of);

        let period = DateRange::year(self.year)?;
        let revenue = aggregate(&ledger.invoices, &ledger.expenses, &period)?;
        let brackets = ledger
            .brackets
            .resolve(self.year)
            .with_context(|| configured_years(&ledger.brackets))?;
        let paid =
            totals_for_period(&ledger.obligations, ObligationKind::IncomeTax, &period, as_of)?;
        let summary =
            compose_income_tax_summary(self.year, &revenue, &ledger.settings, brackets, &paid)?;

        log::info!("Estimated income tax for {}: {}", self.year, summary.estimated_tax);

        if self.json {
            print_json(&summary)
        } else {
            print_summary(&summary);
            Ok(())
        }
    }
}

fn print_summary(summary: &IncomeTaxSummary) {
    println!();
    println!(
        "INCOME TAX {} (flat deduction {}%)",
        summary.year, summary.deduction_rate
    );
    println!();
    println!(
        "  Revenue HT: {} | Deduction: {} | Taxable: {}",
        format_eur(summary.revenue_ht),
        format_eur(summary.deduction),
        format_eur(summary.taxable_income)
    );
    println!();

    let rows: Vec<BracketRow> = summary.breakdown.iter().map(BracketRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();

    println!(
        "  Estimated tax: {} | Paid: {} | Remaining: {}",
        format_eur(summary.estimated_tax),
        format_eur(summary.total_paid),
        format_eur(summary.remaining)
    );
    if summary.is_refund_due() {
        println!(
            "  Overpaid: refund due of {}",
            format_eur(summary.remaining).trim_start_matches('-')
        );
    }
    println!();
}
