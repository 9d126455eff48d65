use super::error::EngineError;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Inclusive calendar date range used to bucket records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::InvalidDateRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// Calendar month, e.g. `month(2025, 2)` is 1 to 28 February 2025.
    pub fn month(year: i32, month: u32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonth { month });
        }
        let start =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(EngineError::InvalidYear { year })?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next_month
            .and_then(|d| d.pred_opt())
            .ok_or(EngineError::InvalidYear { year })?;
        Ok(DateRange { start, end })
    }

    /// Calendar year, 1 January to 31 December.
    pub fn year(year: i32) -> Result<Self, EngineError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = NaiveDate::from_ymd_opt(year, 12, 31);
        match (start, end) {
            (Some(start), Some(end)) => Ok(DateRange { start, end }),
            _ => Err(EngineError::InvalidYear { year }),
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Year and month of the start date, handy for monthly views.
    pub fn year_month(&self) -> (i32, u32) {
        (self.start.year(), self.start.month())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
