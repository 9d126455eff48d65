use super::bracket::BracketScope;
use super::money::Money;
use super::period::DateRange;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;

/// Broad category of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bracket tables are missing or do not partition `[0, ∞)`.
    Configuration,
    /// A caller-supplied value or record is malformed.
    Input,
    /// A monetary value left the fixed-point representation.
    Arithmetic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration error",
            ErrorKind::Input => "input error",
            ErrorKind::Arithmetic => "arithmetic error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no tax brackets configured for {year} ({scope})")]
    MissingBrackets { year: i32, scope: BracketScope },
    #[error("bracket set is empty")]
    EmptyBracketSet,
    #[error("bracket set for {year} ({scope}) contains a bracket for {found_year} ({found_scope})")]
    MixedBracketSet {
        year: i32,
        scope: BracketScope,
        found_year: i32,
        found_scope: BracketScope,
    },
    #[error("lowest bracket starts at {found}, expected 0.00")]
    BracketNotAnchored { found: Money },
    #[error("gap between brackets: {previous_max} to {next_min} is not covered")]
    BracketGap { previous_max: Money, next_min: Money },
    #[error("brackets overlap: next bracket starts at {next_min} before {previous_max}")]
    BracketOverlap { previous_max: Money, next_min: Money },
    #[error("bracket [{min}, {max}) is empty or inverted")]
    InvalidBracketRange { min: Money, max: Money },
    #[error("unbounded bracket at position {position} is not the last one")]
    UnboundedBracketNotLast { position: usize },
    #[error("bracket set has no unbounded top bracket")]
    MissingUnboundedBracket,
    #[error("brackets for {found} cannot be used for {year}")]
    BracketYearMismatch { year: i32, found: i32 },

    #[error("taxable income cannot be negative: {income}")]
    NegativeIncome { income: Money },
    #[error("invalid date range: {start} is after {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("totals cover {found}, expected {expected}")]
    PeriodMismatch { expected: DateRange, found: DateRange },
    #[error("invalid month: {month}")]
    InvalidMonth { month: u32 },
    #[error("year out of range: {year}")]
    InvalidYear { year: i32 },
    #[error("invoice paid on {payment_date} before it was issued on {invoice_date}")]
    PaymentBeforeInvoice {
        invoice_date: NaiveDate,
        payment_date: NaiveDate,
    },
    #[error("obligation period ends on {end} before it starts on {start}")]
    InvalidObligationPeriod { start: NaiveDate, end: NaiveDate },
    #[error("pending obligation has a payment date: {payment_date}")]
    PendingWithPaymentDate { payment_date: NaiveDate },
    #[error("monthly salary cannot be negative: {salary}")]
    NegativeSalary { salary: Money },
    #[error("rate {rate}% is outside 0..=100")]
    InvalidRate { rate: Decimal },
    #[error("invalid decimal amount: '{value}'")]
    InvalidAmount { value: String },

    #[error("monetary value overflows the fixed-point range")]
    Overflow,
    #[error("{value} has more than two decimal places")]
    ExcessPrecision { value: Decimal },
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::MissingBrackets { .. }
            | EngineError::EmptyBracketSet
            | EngineError::MixedBracketSet { .. }
            | EngineError::BracketNotAnchored { .. }
            | EngineError::BracketGap { .. }
            | EngineError::BracketOverlap { .. }
            | EngineError::InvalidBracketRange { .. }
            | EngineError::UnboundedBracketNotLast { .. }
            | EngineError::MissingUnboundedBracket
            | EngineError::BracketYearMismatch { .. } => ErrorKind::Configuration,
            EngineError::NegativeIncome { .. }
            | EngineError::InvalidDateRange { .. }
            | EngineError::PeriodMismatch { .. }
            | EngineError::InvalidMonth { .. }
            | EngineError::InvalidYear { .. }
            | EngineError::PaymentBeforeInvoice { .. }
            | EngineError::InvalidObligationPeriod { .. }
            | EngineError::PendingWithPaymentDate { .. }
            | EngineError::NegativeSalary { .. }
            | EngineError::InvalidRate { .. }
            | EngineError::InvalidAmount { .. } => ErrorKind::Input,
            EngineError::Overflow | EngineError::ExcessPrecision { .. } => ErrorKind::Arithmetic,
        }
    }
}
