//! Brackets command - validate a bracket table and allocate an income

use super::{configured_years, format_eur, print_json, LedgerArgs};
use anyhow::Context;
use clap::{Args, ValueEnum};
use microtax::core::{allocate, BracketAllocation, BracketScope, Money, TaxBracket};
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BracketsCommand {
    #[command(flatten)]
    ledger: LedgerArgs,

    /// Tax year of the bracket set
    #[arg(short, long)]
    year: i32,

    /// Which set to use; by default the user override if there is one
    #[arg(short, long, value_enum)]
    scope: Option<ScopeArg>,

    /// Taxable income to allocate across the brackets
    #[arg(long)]
    income: Option<Money>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    Default,
    User,
}

impl From<ScopeArg> for BracketScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Default => BracketScope::Default,
            ScopeArg::User => BracketScope::UserOverride,
        }
    }
}

#[derive(Debug, Serialize)]
struct BracketsOutput<'a> {
    year: i32,
    brackets: &'a [TaxBracket],
    #[serde(skip_serializing_if = "Option::is_none")]
    income: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_tax: Option<Money>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    breakdown: Vec<BracketAllocation>,
}

/// Row for bracket tables
#[derive(Debug, Clone, Tabled)]
pub struct BracketRow {
    #[tabled(rename = "From")]
    pub from: String,

    #[tabled(rename = "To")]
    pub to: String,

    #[tabled(rename = "Rate")]
    pub rate: String,

    #[tabled(rename = "Taxed Portion")]
    pub portion: String,

    #[tabled(rename = "Tax")]
    pub tax: String,
}

impl From<&BracketAllocation> for BracketRow {
    fn from(allocation: &BracketAllocation) -> Self {
        BracketRow {
            from: format_eur(allocation.min_income),
            to: allocation.max_income.map_or_else(|| "-".to_string(), format_eur),
            rate: format!("{}%", allocation.rate),
            portion: format_eur(allocation.taxable_portion),
            tax: format_eur(allocation.tax_amount),
        }
    }
}

impl BracketsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = self.ledger.load()?;
        let brackets = match self.scope {
            Some(scope) => ledger.brackets.lookup(self.year, scope.into()),
            None => ledger.brackets.resolve(self.year),
        }
        .with_context(|| configured_years(&ledger.brackets))?;

        let allocation = self.income.map(|income| allocate(income, brackets)).transpose()?;

        if self.json {
            return print_json(&BracketsOutput {
                year: self.year,
                brackets,
                income: self.income,
                total_tax: allocation.as_ref().map(|a| a.total_tax),
                breakdown: allocation.map(|a| a.breakdown).unwrap_or_default(),
            });
        }

        println!();
        println!(
            "TAX BRACKETS {} ({}) - {} brackets, valid",
            self.year,
            brackets[0].scope,
            brackets.len()
        );
        println!();

        let rows: Vec<BracketRow> = match &allocation {
            Some(allocation) => allocation.breakdown.iter().map(BracketRow::from).collect(),
            None => brackets
                .iter()
                .map(|b| BracketRow {
                    from: format_eur(b.min_income),
                    to: b.max_income.map_or_else(|| "-".to_string(), format_eur),
                    rate: format!("{}%", b.rate),
                    portion: String::new(),
                    tax: String::new(),
                })
                .collect(),
        };
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);

        if let (Some(income), Some(allocation)) = (self.income, allocation) {
            println!();
            println!(
                "  Income: {} | Total tax: {}",
                format_eur(income),
                format_eur(allocation.total_tax)
            );
        }
        println!();
        Ok(())
    }
}
