use chrono::{Datelike, Days, Local, NaiveDate};

pub const UPCOMING_WINDOW_DAYS: u64 = 7;

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// The birthday's month/day in `year`. 29 February falls back to the 28th
/// in non-leap years.
fn anniversary(birthday: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
}

/// First anniversary of `birthday` on or after `today`.
pub fn next_birthday(birthday: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = anniversary(birthday, today.year())?;
    if this_year >= today {
        Some(this_year)
    } else {
        anniversary(birthday, today.year() + 1)
    }
}

/// Whether the next anniversary lies in `[today, today + UPCOMING_WINDOW_DAYS]`.
pub fn is_upcoming(birthday: NaiveDate, today: NaiveDate) -> bool {
    let Some(window_end) = today.checked_add_days(Days::new(UPCOMING_WINDOW_DAYS)) else {
        return false;
    };
    matches!(next_birthday(birthday, today), Some(next) if next <= window_end)
}
