//! Month grids for date picking.
//!
//! A month is always rendered as six Monday-first weeks (42 cells) so the
//! picker keeps the same shape whatever the month length. Cells before the
//! 1st and after the last day are padding.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SlotError};

pub const GRID_CELLS: usize = 42;
pub const DAYS_PER_WEEK: usize = 7;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    /// Always the first of the month, so every `YearMonth` is a month chrono can represent.
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| SlotError::InvalidMonth(format!("{year}-{month:02}")))
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month() {
            2 if is_leap_year(self.year()) => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Move `delta` months forward (or backward when negative), rolling the year.
    ///
    /// Fails when the target month lies outside the range of representable dates.
    pub fn advance(&self, delta: i32) -> Result<Self> {
        let out_of_range = || SlotError::InvalidMonth(format!("{self} advanced by {delta} months"));
        let total = i64::from(self.year()) * 12 + i64::from(self.month()) - 1 + i64::from(delta);
        let year = i32::try_from(total.div_euclid(12)).map_err(|_| out_of_range())?;
        let month = (total.rem_euclid(12) + 1) as u32;
        Self::new(year, month).map_err(|_| out_of_range())
    }

    pub fn next(&self) -> Result<Self> {
        self.advance(1)
    }

    pub fn prev(&self) -> Result<Self> {
        self.advance(-1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Human heading, e.g. `November 2025`.
    pub fn label(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.first.month0() as usize], self.year())
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = SlotError;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SlotError::InvalidMonth(s.to_string());
        let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = y.parse().map_err(|_| invalid())?;
        let month: u32 = m.parse().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

/// One position in the 6×7 month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    /// Position in the grid, 0..42, row-major from the top-left Monday.
    pub index: usize,
    /// The day shown, or `None` for padding outside the month.
    pub date: Option<NaiveDate>,
    pub selectable: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whether a meeting can be booked on `date`: a weekday no earlier than `today`.
pub fn is_selectable(date: NaiveDate, today: NaiveDate) -> bool {
    !is_weekend(date) && date >= today
}

/// Padding cells before the 1st, with Monday as the first column.
pub fn leading_padding(month: YearMonth) -> usize {
    month.first_day().weekday().num_days_from_monday() as usize
}

/// Build the 42-cell grid for `month`.
///
/// `today` decides which dates are in the past; `selected` is only used to mark
/// `is_selected` and may lie outside the month.
pub fn generate_month_grid(
    month: YearMonth,
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> Vec<CalendarCell> {
    let padding = leading_padding(month) as i64;
    let days = month.days_in_month() as i64;
    let first = month.first_day();

    let cells: Vec<CalendarCell> = (0..GRID_CELLS)
        .map(|index| {
            let day = index as i64 - padding + 1;
            let date = (1..=days)
                .contains(&day)
                .then(|| first.with_day(day as u32))
                .flatten();

            CalendarCell {
                index,
                date,
                selectable: date.is_some_and(|d| is_selectable(d, today)),
                is_today: date == Some(today),
                is_selected: date.is_some() && date == selected,
            }
        })
        .collect();

    debug!(month = %month, padding, days, "generated month grid");

    cells
}

/// The first weekday strictly after `today`. Used as the default selection.
pub fn next_selectable_date(today: NaiveDate) -> NaiveDate {
    today
        .iter_days()
        .skip(1)
        .find(|d| !is_weekend(*d))
        .unwrap_or(today)
}

/// Today's date in `tz` at the instant `now`.
pub fn today_in(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}
