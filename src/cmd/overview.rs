//! Overview command - month-by-month figures for a year

use super::{format_eur, LedgerArgs};
use clap::Args;
use microtax::core::{compose_yearly_overview, Money, PeriodSummary};
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct OverviewCommand {
    #[command(flatten)]
    ledger: LedgerArgs,

    /// Calendar year
    #[arg(short, long)]
    year: i32,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

/// Row for the overview table output
#[derive(Debug, Clone, Tabled, serde::Serialize)]
pub struct OverviewRow {
    #[tabled(rename = "Month")]
    pub month: String,

    #[tabled(rename = "Invoiced HT")]
    pub issued_ht: String,

    #[tabled(rename = "Collected HT")]
    pub collected_ht: String,

    #[tabled(rename = "Collected TTC")]
    pub collected_ttc: String,

    #[tabled(rename = "Expenses HT")]
    pub expenses_ht: String,

    #[tabled(rename = "VAT Due")]
    pub tva_due: String,

    #[tabled(rename = "URSSAF")]
    pub urssaf: String,
}

impl OverviewRow {
    fn new(summary: &PeriodSummary, render: fn(Money) -> String) -> Self {
        let (year, month) = summary.period.year_month();
        OverviewRow {
            month: format!("{}-{:02}", year, month),
            issued_ht: render(summary.issued_ht),
            collected_ht: render(summary.collected_ht),
            collected_ttc: render(summary.collected_ttc),
            expenses_ht: render(summary.expenses_ht),
            tva_due: render(summary.tva_due),
            urssaf: render(summary.urssaf_estimate),
        }
    }
}

impl OverviewCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = self.ledger.load()?;
        let overview = compose_yearly_overview(
            self.year,
            &ledger.invoices,
            &ledger.expenses,
            &ledger.settings,
        )?;

        if self.csv {
            let rows: Vec<OverviewRow> = overview
                .iter()
                .map(|s| OverviewRow::new(s, |m| m.to_string()))
                .collect();
            return write_csv(&rows);
        }

        let rows: Vec<OverviewRow> = overview
            .iter()
            .map(|s| OverviewRow::new(s, format_eur))
            .collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!();
        println!("OVERVIEW {}", self.year);
        println!("{}", table);
        Ok(())
    }
}

fn write_csv(rows: &[OverviewRow]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(io::stdout());
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
