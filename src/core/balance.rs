use super::error::EngineError;
use super::money::Money;
use super::obligation::{totals_for, ObligationKind, ObligationRecord};
use super::settings::Settings;
use chrono::{DateTime, FixedOffset, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Bank balance as last recorded by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AccountBalance {
    pub balance: Money,
    pub updated_at: DateTime<FixedOffset>,
}

/// Cash left once pending obligations and next month's salary are set
/// aside. Negative means a cash-flow shortfall and is returned as is.
pub fn project_available_funds(
    balance: Money,
    pending_tva: Money,
    pending_urssaf: Money,
    pending_income_tax: Money,
    next_month_salary: Money,
) -> Result<Money, EngineError> {
    let reserved = Money::sum([pending_tva, pending_urssaf, pending_income_tax])?;
    balance.checked_sub(reserved)?.checked_sub(next_month_salary)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub balance: Money,
    pub updated_at: DateTime<FixedOffset>,
    pub pending_tva: Money,
    pub pending_urssaf: Money,
    pub pending_income_tax: Money,
    pub total_pending: Money,
    pub next_month_salary: Money,
    pub available_funds: Money,
    pub overdue_count: usize,
    pub at_risk: bool,
}

pub fn summarize_account(
    account: &AccountBalance,
    obligations: &[ObligationRecord],
    settings: &Settings,
    as_of: NaiveDate,
) -> Result<AccountSummary, EngineError> {
    settings.validate()?;
    let tva = totals_for(obligations, ObligationKind::Vat, as_of)?;
    let urssaf = totals_for(obligations, ObligationKind::SocialContribution, as_of)?;
    let income_tax = totals_for(obligations, ObligationKind::IncomeTax, as_of)?;

    let available_funds = project_available_funds(
        account.balance,
        tva.pending,
        urssaf.pending,
        income_tax.pending,
        settings.monthly_salary,
    )?;

    if available_funds.is_negative() {
        log::warn!("Projected funds are negative: {}", available_funds);
    }

    Ok(AccountSummary {
        balance: account.balance,
        updated_at: account.updated_at,
        pending_tva: tva.pending,
        pending_urssaf: urssaf.pending,
        pending_income_tax: income_tax.pending,
        total_pending: Money::sum([tva.pending, urssaf.pending, income_tax.pending])?,
        next_month_salary: settings.monthly_salary,
        available_funds,
        overdue_count: tva.overdue.len() + urssaf.overdue.len() + income_tax.overdue.len(),
        at_risk: available_funds.is_negative(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::obligation::ObligationStatus;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pending(kind: ObligationKind, amount: &str, due: NaiveDate) -> ObligationRecord {
        ObligationRecord {
            kind,
            amount: money(amount),
            status: ObligationStatus::Pending,
            payment_date: None,
            period_start: date(2025, 1, 1),
            period_end: due,
        }
    }

    fn settings(salary: &str) -> Settings {
        Settings {
            urssaf_rate: "21.1".parse().unwrap(),
            estimated_tax_rate: "2.2".parse().unwrap(),
            revenue_deduction_rate: "34".parse().unwrap(),
            monthly_salary: money(salary),
        }
    }

    fn account(balance: &str) -> AccountBalance {
        AccountBalance {
            balance: money(balance),
            updated_at: DateTime::parse_from_rfc3339("2025-03-01T09:00:00+01:00").unwrap(),
        }
    }

    #[test]
    fn projection_subtracts_obligations_and_salary() {
        let available = project_available_funds(
            money("5000"),
            money("800"),
            money("600"),
            money("400"),
            money("3000"),
        )
        .unwrap();
        assert_eq!(available, money("200"));
    }

    #[test]
    fn projection_is_not_clamped() {
        let available = project_available_funds(
            money("1000"),
            money("800"),
            Money::ZERO,
            Money::ZERO,
            money("3000"),
        )
        .unwrap();
        assert_eq!(available, money("-2800"));
    }

    #[test]
    fn account_summary_splits_pending_by_kind() {
        let obligations = vec![
            pending(ObligationKind::Vat, "800", date(2025, 4, 30)),
            pending(ObligationKind::SocialContribution, "600", date(2025, 2, 28)),
            pending(ObligationKind::IncomeTax, "400", date(2025, 5, 31)),
            ObligationRecord {
                status: ObligationStatus::Paid,
                payment_date: Some(date(2025, 1, 20)),
                ..pending(ObligationKind::Vat, "999", date(2025, 1, 31))
            },
        ];
        let summary = summarize_account(
            &account("5000"),
            &obligations,
            &settings("3000"),
            date(2025, 3, 15),
        )
        .unwrap();
        assert_eq!(summary.pending_tva, money("800"));
        assert_eq!(summary.pending_urssaf, money("600"));
        assert_eq!(summary.pending_income_tax, money("400"));
        assert_eq!(summary.total_pending, money("1800"));
        assert_eq!(summary.available_funds, money("200"));
        assert_eq!(summary.overdue_count, 1);
        assert!(!summary.at_risk);
    }

    #[test]
    fn account_summary_flags_shortfall() {
        let obligations = vec![pending(ObligationKind::Vat, "800", date(2025, 4, 30))];
        let summary = summarize_account(
            &account("1000"),
            &obligations,
            &settings("500"),
            date(2025, 3, 15),
        )
        .unwrap();
        assert_eq!(summary.available_funds, money("-300"));
        assert!(summary.at_risk);
    }

    #[test]
    fn negative_salary_rejected() {
        assert_eq!(
            summarize_account(&account("1000"), &[], &settings("-1"), date(2025, 3, 15)),
            Err(EngineError::NegativeSalary { salary: money("-1") })
        );
    }
}
