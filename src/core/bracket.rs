//! Progressive income tax brackets.
//!
//! A bracket set for one `(year, scope)` must partition `[0, ∞)`: the lowest
//! bracket starts at zero, every bracket starts where the previous one ends,
//! and only the last bracket is unbounded. Sets are checked before any tax
//! is computed; a broken table is a configuration error, never zero tax.

use super::error::EngineError;
use super::money::{Money, Percentage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a bracket set comes from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum BracketScope {
    /// Statutory table shipped for the year
    #[default]
    Default,
    /// Table entered by the user, takes precedence over the default
    UserOverride,
}

impl fmt::Display for BracketScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BracketScope::Default => f.write_str("default"),
            BracketScope::UserOverride => f.write_str("user override"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxBracket {
    pub year: i32,
    #[serde(default)]
    pub scope: BracketScope,
    pub min_income: Money,
    /// Upper bound (exclusive); absent for the top bracket
    #[serde(default)]
    pub max_income: Option<Money>,
    pub rate: Percentage,
}

/// Tax attributed to a single bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketAllocation {
    pub min_income: Money,
    pub max_income: Option<Money>,
    pub rate: Percentage,
    pub taxable_portion: Money,
    pub tax_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub total_tax: Money,
    /// One entry per bracket, lowest first
    pub breakdown: Vec<BracketAllocation>,
}

/// Split `taxable_income` across `brackets` and tax each slice.
///
/// Each bracket's tax is rounded to the cent on its own and `total_tax` is
/// the exact sum of those rounded amounts, so the breakdown always adds up
/// to the total.
pub fn allocate(
    taxable_income: Money,
    brackets: &[TaxBracket],
) -> Result<Allocation, EngineError> {
    if taxable_income.is_negative() {
        return Err(EngineError::NegativeIncome {
            income: taxable_income,
        });
    }
    let ordered = ordered_partition(brackets)?;

    let mut total_tax = Money::ZERO;
    let mut breakdown = Vec::with_capacity(ordered.len());

    for bracket in ordered {
        let (taxable_portion, tax_amount) = if taxable_income <= bracket.min_income {
            (Money::ZERO, Money::ZERO)
        } else {
            let ceiling = bracket
                .max_income
                .map_or(taxable_income, |max| max.min(taxable_income));
            let portion = ceiling.checked_sub(bracket.min_income)?.max(Money::ZERO);
            (portion, portion.apply_rate(bracket.rate)?)
        };

        log::debug!(
            "Bracket {}..{} @ {}%: portion {}, tax {}",
            bracket.min_income,
            bracket
                .max_income
                .map_or_else(|| "∞".to_string(), |max| max.to_string()),
            bracket.rate,
            taxable_portion,
            tax_amount
        );

        total_tax = total_tax.checked_add(tax_amount)?;
        breakdown.push(BracketAllocation {
            min_income: bracket.min_income,
            max_income: bracket.max_income,
            rate: bracket.rate,
            taxable_portion,
            tax_amount,
        });
    }

    Ok(Allocation {
        total_tax,
        breakdown,
    })
}

/// Check that `brackets` form a valid partition of `[0, ∞)`.
pub fn validate_partition(brackets: &[TaxBracket]) -> Result<(), EngineError> {
    ordered_partition(brackets).map(|_| ())
}

/// Sort by lower bound and verify the partition invariant.
fn ordered_partition(brackets: &[TaxBracket]) -> Result<Vec<&TaxBracket>, EngineError> {
    let first = brackets.first().ok_or(EngineError::EmptyBracketSet)?;
    if let Some(stray) = brackets
        .iter()
        .find(|b| b.year != first.year || b.scope != first.scope)
    {
        return Err(EngineError::MixedBracketSet {
            year: first.year,
            scope: first.scope,
            found_year: stray.year,
            found_scope: stray.scope,
        });
    }

    let mut ordered: Vec<&TaxBracket> = brackets.iter().collect();
    ordered.sort_by_key(|b| b.min_income);

    if ordered[0].min_income != Money::ZERO {
        return Err(EngineError::BracketNotAnchored {
            found: ordered[0].min_income,
        });
    }

    for (position, pair) in ordered.windows(2).enumerate() {
        let (current, next) = (pair[0], pair[1]);
        let Some(max) = current.max_income else {
            return Err(EngineError::UnboundedBracketNotLast { position });
        };
        if max <= current.min_income {
            return Err(EngineError::InvalidBracketRange {
                min: current.min_income,
                max,
            });
        }
        if next.min_income > max {
            return Err(EngineError::BracketGap {
                previous_max: max,
                next_min: next.min_income,
            });
        }
        if next.min_income < max {
            return Err(EngineError::BracketOverlap {
                previous_max: max,
                next_min: next.min_income,
            });
        }
    }

    if ordered[ordered.len() - 1].max_income.is_some() {
        return Err(EngineError::MissingUnboundedBracket);
    }

    Ok(ordered)
}

/// Validated bracket sets keyed by `(year, scope)`.
///
/// Passed explicitly to whatever needs brackets; there is no process-wide
/// default table.
#[derive(Debug, Clone, Default)]
pub struct BracketTable {
    sets: BTreeMap<(i32, BracketScope), Vec<TaxBracket>>,
}

impl BracketTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group loose brackets by `(year, scope)` and validate every group.
    pub fn from_brackets<I>(brackets: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = TaxBracket>,
    {
        let mut grouped: BTreeMap<(i32, BracketScope), Vec<TaxBracket>> = BTreeMap::new();
        for bracket in brackets {
            grouped
                .entry((bracket.year, bracket.scope))
                .or_default()
                .push(bracket);
        }

        let mut table = BracketTable::new();
        for ((year, scope), set) in grouped {
            table.insert(year, scope, set)?;
        }
        Ok(table)
    }

    /// Replace the set for `(year, scope)` after validating it.
    pub fn insert(
        &mut self,
        year: i32,
        scope: BracketScope,
        mut brackets: Vec<TaxBracket>,
    ) -> Result<(), EngineError> {
        if let Some(stray) = brackets
            .iter()
            .find(|b| b.year != year || b.scope != scope)
        {
            return Err(EngineError::MixedBracketSet {
                year,
                scope,
                found_year: stray.year,
                found_scope: stray.scope,
            });
        }
        validate_partition(&brackets)?;
        brackets.sort_by_key(|b| b.min_income);
        log::debug!("Loaded {} brackets for {} ({})", brackets.len(), year, scope);
        self.sets.insert((year, scope), brackets);
        Ok(())
    }

    pub fn lookup(&self, year: i32, scope: BracketScope) -> Result<&[TaxBracket], EngineError> {
        self.sets
            .get(&(year, scope))
            .map(Vec::as_slice)
            .ok_or(EngineError::MissingBrackets { year, scope })
    }

    /// The user's own table for `year` if present, otherwise the default.
    pub fn resolve(&self, year: i32) -> Result<&[TaxBracket], EngineError> {
        self.lookup(year, BracketScope::UserOverride)
            .or_else(|_| self.lookup(year, BracketScope::Default))
    }

    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.sets.keys().map(|(year, _)| *year).collect();
        years.dedup();
        years
    }
}
