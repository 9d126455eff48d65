use super::error::EngineError;
use super::money::{Money, Percentage};
use super::period::DateRange;
use chrono::{Months, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    fn months(self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Yearly => 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Last day an occurrence may fall on
    #[serde(default)]
    pub until: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub label: Option<String>,
    pub amount_ht: Money,
    /// VAT paid on the expense
    pub tax_amount: Money,
    /// Share of `tax_amount` that can be reclaimed
    pub tax_recovery_rate: Percentage,
    pub date: NaiveDate,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRule>,
}

impl ExpenseRecord {
    /// Dates on which this expense is incurred inside `period`.
    ///
    /// Recurring expenses repeat from their original date, each occurrence
    /// computed from that anchor so short months do not drift the day.
    pub fn occurrences_in(&self, period: &DateRange) -> Vec<NaiveDate> {
        let Some(rule) = &self.recurrence else {
            return if period.contains(self.date) {
                vec![self.date]
            } else {
                Vec::new()
            };
        };

        let last = rule.until.map_or(period.end(), |until| until.min(period.end()));
        let step = rule.frequency.months();
        let mut dates = Vec::new();
        for n in 0u32.. {
            let occurrence = if n == 0 {
                Some(self.date)
            } else {
                n.checked_mul(step)
                    .and_then(|months| self.date.checked_add_months(Months::new(months)))
            };
            match occurrence {
                Some(date) if date <= last => {
                    if period.contains(date) {
                        dates.push(date);
                    }
                }
                _ => break,
            }
        }
        dates
    }

    pub fn recoverable_tva(&self) -> Result<Money, EngineError> {
        self.tax_amount.apply_rate(self.tax_recovery_rate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpenseTotals {
    pub ht: Money,
    pub tax: Money,
    pub tva_recoverable: Money,
    pub occurrences: usize,
}

/// Sum every expense occurrence falling inside `period`.
pub fn aggregate_expenses(
    expenses: &[ExpenseRecord],
    period: &DateRange,
) -> Result<ExpenseTotals, EngineError> {
    let mut totals = ExpenseTotals::default();
    for expense in expenses {
        let count = expense.occurrences_in(period).len();
        if count == 0 {
            continue;
        }
        let recoverable = expense.recoverable_tva()?;
        for _ in 0..count {
            totals.ht = totals.ht.checked_add(expense.amount_ht)?;
            totals.tax = totals.tax.checked_add(expense.tax_amount)?;
            totals.tva_recoverable = totals.tva_recoverable.checked_add(recoverable)?;
        }
        totals.occurrences += count;
    }
    log::debug!(
        "Expenses {}: {} occurrences, {} HT, {} VAT recoverable",
        period,
        totals.occurrences,
        totals.ht,
        totals.tva_recoverable
    );
    Ok(totals)
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

    fn expense(on: NaiveDate, recurrence: Option<RecurrenceRule>) -> ExpenseRecord {
        ExpenseRecord {
            label: None,
            amount_ht: money("100"),
            tax_amount: money("20"),
            tax_recovery_rate: "100".parse().unwrap(),
            date: on,
            recurrence,
        }
    }

    fn monthly(until: Option<NaiveDate>) -> Option<RecurrenceRule> {
        Some(RecurrenceRule {
            frequency: Frequency::Monthly,
            until,
        })
    }

    #[test]
    fn one_off_expense_counted_in_its_month_only() {
        let e = expense(date(2025, 3, 10), None);
        assert_eq!(e.occurrences_in(&DateRange::month(2025, 3).unwrap()).len(), 1);
        assert!(e.occurrences_in(&DateRange::month(2025, 4).unwrap()).is_empty());
    }

    #[test]
    fn monthly_expense_repeats_in_later_months() {
        let e = expense(date(2025, 1, 15), monthly(None));
        let occurrences = e.occurrences_in(&DateRange::year(2025).unwrap());
        assert_eq!(occurrences.len(), 12);
        assert_eq!(occurrences[11], date(2025, 12, 15));
        // nothing before the first occurrence
        assert!(e.occurrences_in(&DateRange::year(2024).unwrap()).is_empty());
    }

    #[test]
    fn month_end_anchor_does_not_drift() {
        let e = expense(date(2025, 1, 31), monthly(None));
        let period = DateRange::new(date(2025, 1, 1), date(2025, 4, 30)).unwrap();
        let occurrences = e.occurrences_in(&period);
        assert_eq!(
            occurrences,
            vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31), date(2025, 4, 30)]
        );
    }

    #[test]
    fn recurrence_stops_at_until() {
        let e = expense(date(2025, 1, 1), monthly(Some(date(2025, 3, 1))));
        assert_eq!(e.occurrences_in(&DateRange::year(2025).unwrap()).len(), 3);
    }

    #[test]
    fn quarterly_and_yearly_steps() {
        let q = expense(
            date(2024, 11, 5),
            Some(RecurrenceRule {
                frequency: Frequency::Quarterly,
                until: None,
            }),
        );
        assert_eq!(
            q.occurrences_in(&DateRange::year(2025).unwrap()),
            vec![date(2025, 2, 5), date(2025, 5, 5), date(2025, 8, 5), date(2025, 11, 5)]
        );

        let y = expense(
            date(2023, 6, 1),
            Some(RecurrenceRule {
                frequency: Frequency::Yearly,
                until: None,
            }),
        );
        assert_eq!(y.occurrences_in(&DateRange::year(2025).unwrap()), vec![date(2025, 6, 1)]);
    }

    #[test]
    fn totals_include_recoverable_vat() {
        let mut partial = expense(date(2025, 2, 3), None);
        partial.tax_recovery_rate = "50".parse().unwrap();
        partial.tax_amount = money("0.05");
        let expenses = vec![expense(date(2025, 2, 1), monthly(None)), partial];

        let totals = aggregate_expenses(&expenses, &DateRange::month(2025, 2).unwrap()).unwrap();
        assert_eq!(totals.occurrences, 2);
        assert_eq!(totals.ht, money("200"));
        assert_eq!(totals.tax, money("20.05"));
        // 0.05 × 50% = 0.025 -> 0.03
        assert_eq!(totals.tva_recoverable, money("20.03"));
    }
}
