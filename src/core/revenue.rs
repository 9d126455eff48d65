//! Invoice aggregation on accrual and cash bases.
//!
//! Issued (accrual) totals bucket invoices by the date they were issued;
//! collected (cash) totals bucket them by the date the money arrived. Social
//! contributions are owed on cash collected, so the two figures are kept in
//! separate types rather than behind a flag.

use super::error::EngineError;
use super::expense::{aggregate_expenses, ExpenseRecord, ExpenseTotals};
use super::money::{Money, Percentage};
use super::period::DateRange;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Revenue side of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RevenueRecord {
    /// Invoice number, for display only
    #[serde(default)]
    pub reference: Option<String>,
    pub amount_ht: Money,
    /// Gross amount as stored when the invoice was created
    pub amount_ttc: Money,
    pub tax_rate: Percentage,
    pub invoice_date: NaiveDate,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub canceled: bool,
}

impl RevenueRecord {
    pub fn validate(&self) -> Result<(), EngineError> {
        match self.payment_date {
            Some(payment_date) if payment_date < self.invoice_date => {
                Err(EngineError::PaymentBeforeInvoice {
                    invoice_date: self.invoice_date,
                    payment_date,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Invoices issued during the period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccrualTotals {
    pub ht: Money,
    pub ttc: Money,
    pub tva: Money,
    pub count: usize,
}

/// Invoices paid during the period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CashTotals {
    pub ht: Money,
    pub ttc: Money,
    pub tva: Money,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevenueTotals {
    pub period: DateRange,
    pub issued: AccrualTotals,
    pub collected: CashTotals,
    pub expenses: ExpenseTotals,
}

impl RevenueTotals {
    pub fn issued_ht(&self) -> Money {
        self.issued.ht
    }

    pub fn issued_ttc(&self) -> Money {
        self.issued.ttc
    }

    pub fn collected_ttc(&self) -> Money {
        self.collected.ttc
    }

    /// VAT on services is due when payment is received.
    pub fn tva_collected(&self) -> Money {
        self.collected.tva
    }

    pub fn tva_recoverable(&self) -> Money {
        self.expenses.tva_recoverable
    }
}

#[derive(Default)]
struct Running {
    ht: Money,
    ttc: Money,
    count: usize,
}

impl Running {
    fn add(&mut self, record: &RevenueRecord) -> Result<(), EngineError> {
        self.ht = self.ht.checked_add(record.amount_ht)?;
        self.ttc = self.ttc.checked_add(record.amount_ttc)?;
        self.count += 1;
        Ok(())
    }

    fn tva(&self) -> Result<Money, EngineError> {
        self.ttc.checked_sub(self.ht)
    }
}

/// Sum invoices and expenses for `period`.
///
/// Canceled invoices are skipped before anything else, whatever their
/// dates. Gross amounts are taken as stored; they are never recomputed from
/// the net amount and rate.
pub fn aggregate(
    records: &[RevenueRecord],
    expenses: &[ExpenseRecord],
    period: &DateRange,
) -> Result<RevenueTotals, EngineError> {
    let mut issued = Running::default();
    let mut collected = Running::default();
    let mut canceled = 0;

    for record in records {
        if record.canceled {
            canceled += 1;
            continue;
        }
        record.validate()?;

        if period.contains(record.invoice_date) {
            issued.add(record)?;
        }
        if record.payment_date.is_some_and(|paid| period.contains(paid)) {
            collected.add(record)?;
        }
    }

    log::debug!(
        "Revenue {}: {} issued, {} collected, {} canceled skipped",
        period,
        issued.count,
        collected.count,
        canceled
    );

    Ok(RevenueTotals {
        period: *period,
        issued: AccrualTotals {
            ht: issued.ht,
            ttc: issued.ttc,
            tva: issued.tva()?,
            count: issued.count,
        },
        collected: CashTotals {
            ht: collected.ht,
            ttc: collected.ttc,
            tva: collected.tva()?,
            count: collected.count,
        },
        expenses: aggregate_expenses(expenses, period)?,
    })
}
