use clap::{Parser, Subcommand};

mod cmd;

use cmd::{
    balance::BalanceCommand, brackets::BracketsCommand, dashboard::DashboardCommand,
    income_tax::IncomeTaxCommand, obligations::ObligationsCommand, overview::OverviewCommand,
    schema::SchemaCommand,
};

#[derive(Parser, Debug)]
#[command(
    name = "microtax",
    version,
    about = "Tax, VAT and cash-flow summaries for self-employed bookkeeping"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate the year's income tax from invoiced revenue
    IncomeTax(IncomeTaxCommand),
    /// Monthly revenue, VAT, URSSAF and net figures
    Dashboard(DashboardCommand),
    /// Funds available once obligations and salary are set aside
    Balance(BalanceCommand),
    /// Month-by-month figures for a whole year
    Overview(OverviewCommand),
    /// Pending, paid and overdue statutory payments
    Obligations(ObligationsCommand),
    /// Check a bracket table and allocate an income across it
    Brackets(BracketsCommand),
    /// Print the expected input formats
    Schema(SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::IncomeTax(cmd) => cmd.exec(),
        Command::Dashboard(cmd) => cmd.exec(),
        Command::Balance(cmd) => cmd.exec(),
        Command::Overview(cmd) => cmd.exec(),
        Command::Obligations(cmd) => cmd.exec(),
        Command::Brackets(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
