//! Campaign calendar and think-period scheduling.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

use crate::constants::{MONTH_START_DAY, TEN_DAY_MARKERS};

/// Errors raised when constructing calendar dates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("month {month} is outside 1..=12")]
    InvalidMonth { month: u8 },
    #[error("day {day} is outside 1..={max} for {year}-{month:02}")]
    InvalidDay { year: u16, month: u8, day: u8, max: u8 },
}

/// A Gregorian calendar date on the campaign clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl GameDate {
    /// Build a validated date.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError` when the month or day is out of range.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth { month });
        }
        let max = days_in_month(year, month);
        if day == 0 || day > max {
            return Err(CalendarError::InvalidDay {
                year,
                month,
                day,
                max,
            });
        }
        Ok(Self { year, month, day })
    }

    /// The following calendar day.
    #[must_use]
    pub fn next_day(self) -> Self {
        if self.day < days_in_month(self.year, self.month) {
            return Self {
                day: self.day + 1,
                ..self
            };
        }
        if self.month < 12 {
            Self {
                year: self.year,
                month: self.month + 1,
                day: 1,
            }
        } else {
            Self {
                year: self.year.saturating_add(1),
                month: 1,
                day: 1,
            }
        }
    }

    #[must_use]
    pub const fn is_month_start(self) -> bool {
        self.day == MONTH_START_DAY
    }
}

impl Default for GameDate {
    fn default() -> Self {
        Self {
            year: 2050,
            month: 1,
            day: 1,
        }
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

#[must_use]
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[must_use]
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Cadence at which faction logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkPeriod {
    Daily,
    TenDay,
    Monthly,
}

impl ThinkPeriod {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::TenDay => "ten_day",
            Self::Monthly => "monthly",
        }
    }
}

pub type ThinkPeriods = SmallVec<[ThinkPeriod; 3]>;

/// Periods due on arrival at `date`, in execution order.
#[must_use]
pub fn think_periods(date: GameDate) -> ThinkPeriods {
    let mut periods = ThinkPeriods::new();
    periods.push(ThinkPeriod::Daily);
    if TEN_DAY_MARKERS.contains(&date.day) {
        periods.push(ThinkPeriod::TenDay);
    }
    if date.is_month_start() {
        periods.push(ThinkPeriod::Monthly);
    }
    periods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_dates() {
        assert_eq!(
            GameDate::new(2050, 13, 1),
            Err(CalendarError::InvalidMonth { month: 13 })
        );
        assert!(GameDate::new(2051, 2, 29).is_err());
        assert!(GameDate::new(2052, 2, 29).is_ok());
        assert!(GameDate::new(2050, 4, 0).is_err());
    }

    #[test]
    fn next_day_rolls_months_and_years() {
        let end_of_feb = GameDate::new(2052, 2, 29).unwrap();
        assert_eq!(end_of_feb.next_day(), GameDate::new(2052, 3, 1).unwrap());
        let new_year = GameDate::new(2050, 12, 31).unwrap().next_day();
        assert_eq!(new_year, GameDate::new(2051, 1, 1).unwrap());
        assert_eq!(new_year.to_string(), "2051-01-01");
    }

    #[test]
    fn periods_follow_day_markers() {
        let plain = think_periods(GameDate::new(2050, 5, 7).unwrap());
        assert_eq!(plain.as_slice(), &[ThinkPeriod::Daily]);

        let ten = think_periods(GameDate::new(2050, 5, 20).unwrap());
        assert_eq!(ten.as_slice(), &[ThinkPeriod::Daily, ThinkPeriod::TenDay]);

        let month = think_periods(GameDate::new(2050, 6, 1).unwrap());
        assert_eq!(month.as_slice(), &[ThinkPeriod::Daily, ThinkPeriod::Monthly]);
    }

    #[test]
    fn century_years_are_not_leap_unless_divisible_by_400() {
        assert!(!is_leap_year(2100));
        assert!(is_leap_year(2000));
        assert_eq!(days_in_month(2100, 2), 28);
    }
}
