//! Date range checks applied to a search before any network call.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Input and storage format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Oldest allowed start date, in days before today.
pub const MAX_PAST_DAYS: u64 = 365;

/// Latest allowed end date, in days after today.
pub const MAX_FUTURE_DAYS: u64 = 7;

/// Longest allowed distance between start and end, in days.
pub const MAX_SPAN_DAYS: i64 = 30;

/// A validated, inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of calendar days covered, both ends included.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Reason a requested date range was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("dates must be formatted as YYYY-MM-DD")]
    InvalidFormat,

    #[error("start date is after end date")]
    StartAfterEnd,

    #[error("start date is more than 365 days in the past")]
    StartTooOld,

    #[error("end date is more than 7 days in the future")]
    EndTooFarFuture,

    #[error("date range spans more than 30 days")]
    RangeTooLong,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "Invalid date format, use YYYY-MM-DD",
            Self::StartAfterEnd => "Start date cannot be after the end date",
            Self::StartTooOld => "Start date is too far in the past",
            Self::EndTooFarFuture => "End date too far into the future, maximum of 7 days",
            Self::RangeTooLong => "Date range too long, maximum of 30 days",
        }
    }
}

/// Parse a single `YYYY-MM-DD` date, ignoring surrounding whitespace.
pub fn parse_date(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat)
}

/// Validate a requested date range against `today`.
///
/// Checks run in a fixed order and the first failure is returned:
/// format, ordering, start age, end horizon, then span. All limits are
/// inclusive.
pub fn validate(
    start_text: &str,
    end_text: &str,
    today: NaiveDate,
) -> Result<DateRange, ValidationError> {
    let start = parse_date(start_text)?;
    let end = parse_date(end_text)?;

    if start > end {
        return Err(ValidationError::StartAfterEnd);
    }

    let earliest = today
        .checked_sub_days(Days::new(MAX_PAST_DAYS))
        .unwrap_or(NaiveDate::MIN);
    if start < earliest {
        return Err(ValidationError::StartTooOld);
    }

    let latest = today
        .checked_add_days(Days::new(MAX_FUTURE_DAYS))
        .unwrap_or(NaiveDate::MAX);
    if end > latest {
        return Err(ValidationError::EndTooFarFuture);
    }

    if (end - start).num_days() > MAX_SPAN_DAYS {
        return Err(ValidationError::RangeTooLong);
    }

    Ok(DateRange { start, end })
}
