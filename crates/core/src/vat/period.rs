//! Reporting periods (`YYYY-MM`).

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})$").expect("period pattern is valid"));

/// Errors that can occur when parsing a reporting period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    /// The input does not have the form `YYYY-MM`.
    #[error("Period '{0}' must have the form YYYY-MM")]
    Format(String),

    /// The month is not 01-12.
    #[error("Period '{period}' has invalid month {month}")]
    Month {
        /// Input period.
        period: String,
        /// Parsed month.
        month: u32,
    },

    /// The year is outside the accepted range.
    #[error("Period '{period}' has year {year} outside {min}-{max}")]
    YearOutOfRange {
        /// Input period.
        period: String,
        /// Parsed year.
        year: i32,
        /// Earliest accepted year.
        min: i32,
        /// Latest accepted year.
        max: i32,
    },
}

/// A calendar month covered by a VAT report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportingPeriod {
    first_day: NaiveDate,
}

impl ReportingPeriod {
    /// Parses a period and checks its year against `min_year..=max_year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the format, month, or year is not acceptable.
    pub fn parse(input: &str, min_year: i32, max_year: i32) -> Result<Self, PeriodError> {
        let trimmed = input.trim();
        let captures = PERIOD
            .captures(trimmed)
            .ok_or_else(|| PeriodError::Format(trimmed.to_string()))?;

        let year: i32 = captures[1]
            .parse()
            .map_err(|_| PeriodError::Format(trimmed.to_string()))?;
        let month: u32 = captures[2]
            .parse()
            .map_err(|_| PeriodError::Format(trimmed.to_string()))?;

        if !(1..=12).contains(&month) {
            return Err(PeriodError::Month {
                period: trimmed.to_string(),
                month,
            });
        }

        if !(min_year..=max_year).contains(&year) {
            return Err(PeriodError::YearOutOfRange {
                period: trimmed.to_string(),
                year,
                min: min_year,
                max: max_year,
            });
        }

        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| PeriodError::Format(trimmed.to_string()))?;

        Ok(Self { first_day })
    }

    /// Returns the year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// Returns the month (1-12).
    #[must_use]
    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// Returns the first day of the period.
    #[must_use]
    pub const fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Returns the last day of the period.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// Returns true if `date` falls within the period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }
}

impl std::fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_valid_period() {
        let period = ReportingPeriod::parse("2025-12", 2000, 2099).unwrap();
        assert_eq!(period.year(), 2025);
        assert_eq!(period.month(), 12);
        assert_eq!(period.to_string(), "2025-12");
        assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_last_day_handles_leap_years() {
        let period = ReportingPeriod::parse("2024-02", 2000, 2099).unwrap();
        assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(period.contains(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
    }

    #[rstest]
    #[case("2025-1")]
    #[case("25-01")]
    #[case("2025/01")]
    #[case("2025-01-01")]
    #[case("")]
    #[case("januari 2025")]
    fn test_bad_format(#[case] input: &str) {
        assert!(matches!(
            ReportingPeriod::parse(input, 2000, 2099),
            Err(PeriodError::Format(_))
        ));
    }

    #[rstest]
    #[case("2025-00", 0)]
    #[case("2025-13", 13)]
    fn test_bad_month(#[case] input: &str, #[case] month: u32) {
        assert_eq!(
            ReportingPeriod::parse(input, 2000, 2099),
            Err(PeriodError::Month {
                period: input.to_string(),
                month
            })
        );
    }

    #[test]
    fn test_year_out_of_range() {
        assert!(matches!(
            ReportingPeriod::parse("1899-05", 2000, 2099),
            Err(PeriodError::YearOutOfRange { year: 1899, .. })
        ));
        assert!(ReportingPeriod::parse("2100-01", 2000, 2099).is_err());
    }
}
