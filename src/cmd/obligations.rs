//! Obligations command - pending, paid and overdue statutory payments

use super::{as_of_or_today, format_eur, print_json, LedgerArgs};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use microtax::core::{totals, totals_for, ObligationKind, ObligationTotals};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ObligationsCommand {
    #[command(flatten)]
    ledger: LedgerArgs,

    /// Only this kind of obligation
    #[arg(short, long, value_enum)]
    kind: Option<KindArg>,

    /// Date used to decide what is overdue (defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Vat,
    Urssaf,
    IncomeTax,
}

impl From<KindArg> for ObligationKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Vat => ObligationKind::Vat,
            KindArg::Urssaf => ObligationKind::SocialContribution,
            KindArg::IncomeTax => ObligationKind::IncomeTax,
        }
    }
}

#[derive(Debug, Clone, Tabled)]
struct OverdueRow {
    #[tabled(rename = "Kind")]
    kind: String,

    #[tabled(rename = "Period")]
    period: String,

    #[tabled(rename = "Due")]
    due: String,

    #[tabled(rename = "Days Late")]
    days_late: i64,

    #[tabled(rename = "Amount")]
    amount: String,
}

impl ObligationsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = self.ledger.load()?;
        let as_of = as_of_or_today(self.as_of);

        let result = match self.kind {
            Some(kind) => totals_for(&ledger.obligations, kind.into(), as_of)?,
            None => totals(&ledger.obligations, as_of)?,
        };

        if self.json {
            print_json(&result)
        } else {
            print_totals(&result)
        }
    }
}

fn print_totals(t: &ObligationTotals) -> anyhow::Result<()> {
    println!();
    println!("OBLIGATIONS (as of {})", t.as_of);
    println!();
    println!(
        "  Pending: {} | Paid: {} | Overdue: {}",
        format_eur(t.pending),
        format_eur(t.paid),
        format_eur(t.overdue_amount()?)
    );
    println!();

    if t.overdue.is_empty() {
        println!("\u{2713} Nothing overdue.");
    } else {
        let rows: Vec<OverdueRow> = t
            .overdue
            .iter()
            .map(|o| OverdueRow {
                kind: o.kind.to_string(),
                period: format!("{} to {}", o.period_start, o.period_end),
                due: o.due_date().to_string(),
                days_late: (t.as_of - o.due_date()).num_days(),
                amount: format_eur(o.amount),
            })
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("\u{26A0} {} overdue:", t.overdue.len());
        println!("{}", table);
    }
    println!();
    Ok(())
}
