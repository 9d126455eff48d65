use super::error::EngineError;
use super::money::Money;
use super::period::DateRange;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObligationKind {
    Vat,
    SocialContribution,
    IncomeTax,
}

impl fmt::Display for ObligationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObligationKind::Vat => "VAT",
            ObligationKind::SocialContribution => "URSSAF",
            ObligationKind::IncomeTax => "Income tax",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObligationStatus {
    Pending,
    Paid,
}

/// A statutory payment owed for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ObligationRecord {
    pub kind: ObligationKind,
    pub amount: Money,
    pub status: ObligationStatus,
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    pub period_start: NaiveDate,
    /// Also the due date
    pub period_end: NaiveDate,
}

impl ObligationRecord {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.period_end < self.period_start {
            return Err(EngineError::InvalidObligationPeriod {
                start: self.period_start,
                end: self.period_end,
            });
        }
        match (self.status, self.payment_date) {
            (ObligationStatus::Pending, Some(payment_date)) => {
                Err(EngineError::PendingWithPaymentDate { payment_date })
            }
            _ => Ok(()),
        }
    }

    pub fn due_date(&self) -> NaiveDate {
        self.period_end
    }

    /// Pending and due strictly before `as_of`.
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.status == ObligationStatus::Pending && self.period_end < as_of
    }

    /// Whether the obligation's period shares at least one day with `period`.
    pub fn overlaps(&self, period: &DateRange) -> bool {
        self.period_start <= period.end() && period.start() <= self.period_end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObligationTotals {
    pub as_of: NaiveDate,
    pub pending: Money,
    pub paid: Money,
    /// Copies of the overdue records, in input order
    pub overdue: Vec<ObligationRecord>,
}

impl ObligationTotals {
    pub fn overdue_amount(&self) -> Result<Money, EngineError> {
        Money::sum(self.overdue.iter().map(|o| o.amount))
    }
}

/// Pending, paid and overdue totals as seen on `as_of`.
///
/// Statuses are read, never changed: marking an obligation paid belongs to
/// whoever records the payment.
pub fn totals(
    records: &[ObligationRecord],
    as_of: NaiveDate,
) -> Result<ObligationTotals, EngineError> {
    summarize(records.iter(), as_of)
}

/// Same as [`totals`], restricted to one kind of obligation.
pub fn totals_for(
    records: &[ObligationRecord],
    kind: ObligationKind,
    as_of: NaiveDate,
) -> Result<ObligationTotals, EngineError> {
    summarize(records.iter().filter(|r| r.kind == kind), as_of)
}

/// Same as [`totals_for`], keeping only obligations whose period overlaps
/// `period`, e.g. the income tax instalments of one tax year.
pub fn totals_for_period(
    records: &[ObligationRecord],
    kind: ObligationKind,
    period: &DateRange,
    as_of: NaiveDate,
) -> Result<ObligationTotals, EngineError> {
    summarize(
        records
            .iter()
            .filter(|r| r.kind == kind && r.overlaps(period)),
        as_of,
    )
}

fn summarize<'a, I>(records: I, as_of: NaiveDate) -> Result<ObligationTotals, EngineError>
where
    I: Iterator<Item = &'a ObligationRecord>,
{
    let mut pending = Money::ZERO;
    let mut paid = Money::ZERO;
    let mut overdue = Vec::new();

    for record in records {
        record.validate()?;
        match record.status {
            ObligationStatus::Pending => {
                pending = pending.checked_add(record.amount)?;
                if record.is_overdue(as_of) {
                    overdue.push(record.clone());
                }
            }
            ObligationStatus::Paid => paid = paid.checked_add(record.amount)?,
        }
    }

    log::debug!(
        "Obligations as of {}: pending {}, paid {}, {} overdue",
        as_of,
        pending,
        paid,
        overdue.len()
    );

    Ok(ObligationTotals {
        as_of,
        pending,
        paid,
        overdue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn obligation(
        kind: ObligationKind,
        amount: &str,
        status: ObligationStatus,
        end: NaiveDate,
    ) -> ObligationRecord {
        ObligationRecord {
            kind,
            amount: money(amount),
            status,
            payment_date: match status {
                ObligationStatus::Paid => Some(end),
                ObligationStatus::Pending => None,
            },
            period_start: date(2025, 1, 1),
            period_end: end,
        }
    }

    #[test]
    fn overdue_only_after_due_date() {
        let records = vec![obligation(
            ObligationKind::Vat,
            "800",
            ObligationStatus::Pending,
            date(2025, 1, 31),
        )];

        let next_day = totals(&records, date(2025, 2, 1)).unwrap();
        assert_eq!(next_day.overdue.len(), 1);
        assert_eq!(next_day.overdue_amount().unwrap(), money("800"));

        let due_day = totals(&records, date(2025, 1, 31)).unwrap();
        assert!(due_day.overdue.is_empty());
        assert_eq!(due_day.pending, money("800"));
    }

    #[test]
    fn paid_obligations_never_overdue() {
        let records = vec![
            obligation(ObligationKind::Vat, "800", ObligationStatus::Paid, date(2025, 1, 31)),
            obligation(
                ObligationKind::SocialContribution,
                "600",
                ObligationStatus::Pending,
                date(2025, 3, 31),
            ),
        ];
        let t = totals(&records, date(2025, 6, 1)).unwrap();
        assert_eq!(t.paid, money("800"));
        assert_eq!(t.pending, money("600"));
        assert_eq!(t.overdue.len(), 1);
        assert_eq!(t.overdue[0].kind, ObligationKind::SocialContribution);
        // input left untouched
        assert_eq!(records[1].status, ObligationStatus::Pending);
    }

    #[test]
    fn totals_for_filters_by_kind() {
        let records = vec![
            obligation(
                ObligationKind::IncomeTax,
                "400",
                ObligationStatus::Pending,
                date(2025, 9, 30),
            ),
            obligation(ObligationKind::IncomeTax, "250", ObligationStatus::Paid, date(2025, 5, 31)),
            obligation(ObligationKind::Vat, "800", ObligationStatus::Pending, date(2025, 9, 30)),
        ];
        let t = totals_for(&records, ObligationKind::IncomeTax, date(2025, 6, 1)).unwrap();
        assert_eq!(t.pending, money("400"));
        assert_eq!(t.paid, money("250"));
        assert!(t.overdue.is_empty());
    }

    #[test]
    fn inconsistent_records_rejected() {
        let mut inverted = obligation(
            ObligationKind::Vat,
            "1",
            ObligationStatus::Pending,
            date(2025, 1, 31),
        );
        inverted.period_start = date(2025, 2, 1);
        assert!(matches!(
            totals(&[inverted], date(2025, 3, 1)),
            Err(EngineError::InvalidObligationPeriod { .. })
        ));

        let mut pending_paid = obligation(
            ObligationKind::Vat,
            "1",
            ObligationStatus::Pending,
            date(2025, 1, 31),
        );
        pending_paid.payment_date = Some(date(2025, 1, 15));
        assert_eq!(
            totals(&[pending_paid], date(2025, 3, 1)),
            Err(EngineError::PendingWithPaymentDate {
                payment_date: date(2025, 1, 15)
            })
        );
    }

    #[test]
    fn totals_for_period_keeps_one_tax_year() {
        let last_year = ObligationRecord {
            period_start: date(2024, 10, 1),
            ..obligation(
                ObligationKind::IncomeTax,
                "5000",
                ObligationStatus::Paid,
                date(2024, 12, 31),
            )
        };
        let records = vec![
            last_year,
            obligation(
                ObligationKind::IncomeTax,
                "300",
                ObligationStatus::Paid,
                date(2025, 2, 15),
            ),
            obligation(ObligationKind::Vat, "800", ObligationStatus::Paid, date(2025, 1, 31)),
        ];
        let year = DateRange::year(2025).unwrap();

        let t = totals_for_period(&records, ObligationKind::IncomeTax, &year, date(2025, 6, 1))
            .unwrap();
        assert_eq!(t.paid, money("300"));

        let all = totals_for(&records, ObligationKind::IncomeTax, date(2025, 6, 1)).unwrap();
        assert_eq!(all.paid, money("5300"));
    }

    #[test]
    fn overlap_is_inclusive_at_both_ends() {
        let q4 = obligation(
            ObligationKind::IncomeTax,
            "1",
            ObligationStatus::Pending,
            date(2024, 12, 31),
        );
        let q4 = ObligationRecord {
            period_start: date(2024, 10, 1),
            ..q4
        };
        assert!(q4.overlaps(&DateRange::year(2024).unwrap()));
        assert!(!q4.overlaps(&DateRange::year(2025).unwrap()));
        assert!(q4.overlaps(&DateRange::new(date(2024, 12, 31), date(2025, 1, 1)).unwrap()));
    }
}
