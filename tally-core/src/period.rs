//! Statement period and short-date resolution.
//!
//! Transaction rows only print `DD/MON` (e.g. `03/DIC`). The year comes from the
//! statement's declared period, which may straddle a calendar-year boundary.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Spanish three-letter month abbreviations as printed on the statement.
const MONTHS: [(&str, u32); 12] = [
    ("ENE", 1),
    ("FEB", 2),
    ("MAR", 3),
    ("ABR", 4),
    ("MAY", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AGO", 8),
    ("SEP", 9),
    ("OCT", 10),
    ("NOV", 11),
    ("DIC", 12),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("unrecognized month in short date '{token}'")]
    UnrecognizedMonth { token: String },

    #[error("malformed short date '{token}' (expected DD/MON)")]
    MalformedShortDate { token: String },

    #[error("'{token}' is not a calendar date")]
    InvalidDate { token: String },

    #[error("statement period starts {start} after it ends {end}")]
    InvertedPeriod { start: NaiveDate, end: NaiveDate },
}

/// Declared statement period (`DEL <start> AL <end>`). Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PeriodBounds")]
pub struct StatementPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked wire form; deserialization goes through [`StatementPeriod::new`].
#[derive(Deserialize)]
struct PeriodBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<PeriodBounds> for StatementPeriod {
    type Error = DateError;

    fn try_from(bounds: PeriodBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

impl StatementPeriod {
    /// Build a period, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateError> {
        if start > end {
            return Err(DateError::InvertedPeriod { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn start_month(&self) -> u32 {
        self.start.month()
    }

    pub fn start_year(&self) -> i32 {
        self.start.year()
    }

    pub fn end_year(&self) -> i32 {
        self.end.year()
    }

    /// Traceability tag copied onto every transaction of this statement.
    pub fn source_tag(&self) -> String {
        format!("bbva_pdf_{}_{}", self.start, self.end)
    }

    /// Resolve a `DD/MON` token to an absolute date within this period.
    ///
    /// Months before the period's start month belong to the end year
    /// (December -> January rollover); everything else to the start year.
    pub fn resolve_short_date(&self, token: &str) -> Result<NaiveDate, DateError> {
        let malformed = || DateError::MalformedShortDate {
            token: token.to_string(),
        };

        let (day_raw, month_raw) = token.trim().split_once('/').ok_or_else(malformed)?;
        let day: u32 = day_raw.trim().parse().map_err(|_| malformed())?;
        let month = month_number(month_raw).ok_or_else(|| DateError::UnrecognizedMonth {
            token: token.to_string(),
        })?;

        let year = if month < self.start_month() {
            self.end_year()
        } else {
            self.start_year()
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateError::InvalidDate {
            token: token.to_string(),
        })
    }
}

/// Month number for a Spanish abbreviation, case-insensitive.
pub fn month_number(abbr: &str) -> Option<u32> {
    let abbr = abbr.trim().to_uppercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == abbr)
        .map(|(_, n)| *n)
}

/// Inverse of [`month_number`], used to render `DD/MON` tokens.
pub fn month_abbr(month: u32) -> Option<&'static str> {
    MONTHS.iter().find(|(_, n)| *n == month).map(|(name, _)| *name)
}
