//! Balance command - available funds after obligations and salary

use super::{as_of_or_today, format_eur, print_json, LedgerArgs};
use chrono::NaiveDate;
use clap::Args;
use microtax::core::{summarize_account, AccountSummary};

#[derive(Args, Debug)]
pub struct BalanceCommand {
    #[command(flatten)]
    ledger: LedgerArgs,

    /// Date used to evaluate obligations (defaults to today)
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl BalanceCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = self.ledger.load()?;
        let as_of = as_of_or_today(self.as_of);

        let Some(account) = &ledger.account else {
            anyhow::bail!(
                "The ledger has no account balance. Add an \"account\" entry to the input."
            );
        };
        let summary = summarize_account(account, &ledger.obligations, &ledger.settings, as_of)?;

        if self.json {
            print_json(&summary)
        } else {
            print_account(&summary);
            Ok(())
        }
    }
}

fn print_account(s: &AccountSummary) {
    println!();
    println!("ACCOUNT (balance updated {})", s.updated_at.format("%Y-%m-%d %H:%M"));
    println!();
    println!("  Balance: {}", format_eur(s.balance));
    println!(
        "  Pending VAT: {} | URSSAF: {} | Income tax: {}",
        format_eur(s.pending_tva),
        format_eur(s.pending_urssaf),
        format_eur(s.pending_income_tax)
    );
    println!("  Next month salary: {}", format_eur(s.next_month_salary));
    println!();
    println!("AVAILABLE FUNDS: {}", format_eur(s.available_funds));
    if s.at_risk {
        println!("  \u{26A0} Not enough cash to cover obligations and salary");
    }
    if s.overdue_count > 0 {
        println!("  \u{26A0} {} overdue obligation(s)", s.overdue_count);
    }
    println!();
}
