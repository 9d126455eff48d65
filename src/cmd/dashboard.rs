//! Dashboard command - monthly figures for the presentation layer

use super::{as_of_or_today, format_eur, print_json, LedgerArgs};
use chrono::NaiveDate;
use clap::Args;
use microtax::core::{aggregate, compose_dashboard_summary, totals, DashboardSummary, DateRange};

#[derive(Args, Debug)]
pub struct DashboardCommand {
    #[command(flatten)]
    ledger: LedgerArgs,

    /// Calendar year
    #[arg(short, long)]
    year: i32,

    /// Month number, 1 to 12
    #[arg(short, long)]
    month: u32,

    /// Date used to evaluate obligations (defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl DashboardCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = self.ledger.load()?;
        let as_of = as_of_or_today(self.as_of);

        let period = DateRange::month(self.year, self.month)?;
        let revenue = aggregate(&ledger.invoices, &ledger.expenses, &period)?;
        // whole ledger, so earlier months' unpaid obligations stay visible
        let obligations = totals(&ledger.obligations, as_of)?;
        let summary = compose_dashboard_summary(
            self.month,
            self.year,
            &revenue,
            &obligations,
            &ledger.settings,
        )?;

        if self.json {
            print_json(&summary)
        } else {
            print_dashboard(&summary, as_of);
            Ok(())
        }
    }
}

fn print_dashboard(d: &DashboardSummary, as_of: NaiveDate) {
    println!();
    println!("DASHBOARD {}-{:02}", d.year, d.month);
    println!();

    println!("REVENUE");
    println!(
        "  Invoiced HT: {} | TTC: {}",
        format_eur(d.revenue_ht),
        format_eur(d.revenue_ttc)
    );
    println!(
        "  Collected HT: {} | TTC: {}",
        format_eur(d.collected_ht),
        format_eur(d.collected_ttc)
    );
    println!("  Expenses HT: {}", format_eur(d.expenses_ht));
    println!();

    println!("VAT");
    println!(
        "  Collected: {} | Recoverable: {} | Due: {}",
        format_eur(d.tva_collected),
        format_eur(d.tva_recoverable),
        format_eur(d.tva_due)
    );
    println!();

    println!("ESTIMATES");
    println!(
        "  URSSAF: {} | Income tax: {}",
        format_eur(d.urssaf_estimate),
        format_eur(d.income_tax_estimate)
    );
    println!("  Net remaining: {}", format_eur(d.net_remaining));
    println!();

    println!("OBLIGATIONS (all periods, as of {})", as_of);
    println!(
        "  Pending: {} | Paid: {} | Overdue: {} ({})",
        format_eur(d.pending_obligations),
        format_eur(d.paid_obligations),
        d.overdue_count,
        format_eur(d.overdue_amount)
    );
    println!();
}
