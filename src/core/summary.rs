//! Period summaries built from aggregated totals.
//!
//! Nothing here is stored; every summary is recomputed from the records so
//! it cannot drift from the ledger.

use super::bracket::{allocate, BracketAllocation, TaxBracket};
use super::error::EngineError;
use super::expense::ExpenseRecord;
use super::money::{Money, Percentage};
use super::obligation::ObligationTotals;
use super::period::DateRange;
use super::revenue::{aggregate, RevenueRecord, RevenueTotals};
use super::settings::Settings;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeTaxSummary {
    pub year: i32,
    /// Revenue invoiced during the year, before VAT
    pub revenue_ht: Money,
    pub deduction_rate: Percentage,
    pub deduction: Money,
    pub taxable_income: Money,
    pub estimated_tax: Money,
    pub breakdown: Vec<BracketAllocation>,
    pub total_paid: Money,
    /// Negative when more has been paid than is owed
    pub remaining: Money,
}

impl IncomeTaxSummary {
    pub fn is_refund_due(&self) -> bool {
        self.remaining.is_negative()
    }
}

/// Estimate the year's income tax under the flat-deduction regime.
///
/// `brackets` must be the set for `year`. `income_tax` should hold only the
/// income tax obligations of that year; its `paid` total is what has already
/// been settled.
pub fn compose_income_tax_summary(
    year: i32,
    revenue: &RevenueTotals,
    settings: &Settings,
    brackets: &[TaxBracket],
    income_tax: &ObligationTotals,
) -> Result<IncomeTaxSummary, EngineError> {
    if let Some(found) = brackets.first().map(|b| b.year).filter(|found| *found != year) {
        return Err(EngineError::BracketYearMismatch { year, found });
    }

    let revenue_ht = revenue.issued_ht();
    let deduction_rate = settings.revenue_deduction_rate;
    let taxable_income = revenue_ht.apply_rate(deduction_rate.complement())?;
    let deduction = revenue_ht.checked_sub(taxable_income)?;

    let allocation = allocate(taxable_income, brackets)?;
    let total_paid = income_tax.paid;
    let remaining = allocation.total_tax.checked_sub(total_paid)?;

    log::debug!(
        "Income tax {}: taxable {} after {}% deduction, tax {}, paid {}, remaining {}",
        year,
        taxable_income,
        deduction_rate,
        allocation.total_tax,
        total_paid,
        remaining
    );

    Ok(IncomeTaxSummary {
        year,
        revenue_ht,
        deduction_rate,
        deduction,
        taxable_income,
        estimated_tax: allocation.total_tax,
        breakdown: allocation.breakdown,
        total_paid,
        remaining,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub month: u32,
    pub year: i32,
    pub revenue_ht: Money,
    pub revenue_ttc: Money,
    pub collected_ht: Money,
    pub collected_ttc: Money,
    pub expenses_ht: Money,
    pub tva_collected: Money,
    pub tva_recoverable: Money,
    /// Negative when recoverable VAT exceeds VAT collected
    pub tva_due: Money,
    pub urssaf_estimate: Money,
    pub income_tax_estimate: Money,
    pub net_remaining: Money,
    /// Obligation figures below cover whatever obligations were passed in
    pub pending_obligations: Money,
    pub paid_obligations: Money,
    pub overdue_count: usize,
    pub overdue_amount: Money,
}

/// Monthly dashboard figures.
///
/// `revenue` must be aggregated over exactly that month. Revenue and the
/// income tax estimate use invoices issued in the month; the URSSAF estimate
/// uses cash collected in the month. Obligation figures are taken from
/// `obligations` as given.
pub fn compose_dashboard_summary(
    month: u32,
    year: i32,
    revenue: &RevenueTotals,
    obligations: &ObligationTotals,
    settings: &Settings,
) -> Result<DashboardSummary, EngineError> {
    let expected = DateRange::month(year, month)?;
    if revenue.period != expected {
        return Err(EngineError::PeriodMismatch {
            expected,
            found: revenue.period,
        });
    }

    let revenue_ht = revenue.issued_ht();
    let expenses_ht = revenue.expenses.ht;
    let urssaf_estimate = revenue.collected.ht.apply_rate(settings.urssaf_rate)?;
    let income_tax_estimate = revenue_ht.apply_rate(settings.estimated_tax_rate)?;
    let net_remaining = revenue_ht
        .checked_sub(expenses_ht)?
        .checked_sub(urssaf_estimate)?
        .checked_sub(income_tax_estimate)?;

    Ok(DashboardSummary {
        month,
        year,
        revenue_ht,
        revenue_ttc: revenue.issued_ttc(),
        collected_ht: revenue.collected.ht,
        collected_ttc: revenue.collected_ttc(),
        expenses_ht,
        tva_collected: revenue.tva_collected(),
        tva_recoverable: revenue.tva_recoverable(),
        tva_due: revenue.tva_collected().checked_sub(revenue.tva_recoverable())?,
        urssaf_estimate,
        income_tax_estimate,
        net_remaining,
        pending_obligations: obligations.pending,
        paid_obligations: obligations.paid,
        overdue_count: obligations.overdue.len(),
        overdue_amount: obligations.overdue_amount()?,
    })
}

/// One row of a yearly overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub period: DateRange,
    pub issued_ht: Money,
    pub collected_ht: Money,
    pub collected_ttc: Money,
    pub expenses_ht: Money,
    pub tva_due: Money,
    pub urssaf_estimate: Money,
}

pub fn compose_period_summary(
    revenue: &RevenueTotals,
    settings: &Settings,
) -> Result<PeriodSummary, EngineError> {
    Ok(PeriodSummary {
        period: revenue.period,
        issued_ht: revenue.issued_ht(),
        collected_ht: revenue.collected.ht,
        collected_ttc: revenue.collected_ttc(),
        expenses_ht: revenue.expenses.ht,
        tva_due: revenue.tva_collected().checked_sub(revenue.tva_recoverable())?,
        urssaf_estimate: revenue.collected.ht.apply_rate(settings.urssaf_rate)?,
    })
}

/// Twelve monthly summaries for `year`, January first.
pub fn compose_yearly_overview(
    year: i32,
    records: &[RevenueRecord],
    expenses: &[ExpenseRecord],
    settings: &Settings,
) -> Result<Vec<PeriodSummary>, EngineError> {
    (1..=12)
        .map(|month| {
            let period = DateRange::month(year, month)?;
            let totals = aggregate(records, expenses, &period)?;
            compose_period_summary(&totals, settings)
        })
        .collect()
}
