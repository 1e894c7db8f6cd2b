use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, LocalResult, Months, NaiveDate, TimeZone};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid date range '{0}' (expected one of: {list})", list = RangeKeyword::ALL.map(|k| k.as_str()).join(", "))]
    InvalidKeyword(String),

    #[error("Date range '{0}' falls outside the representable calendar")]
    Unrepresentable(RangeKeyword),
}

/// Relative date expressions accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKeyword {
    Today,
    Yesterday,
    LastThreeDays,
    ThisWeek,
    LastWeek,
    ThisMonth,
    LastMonth,
}

impl RangeKeyword {
    pub const ALL: [RangeKeyword; 7] = [
        RangeKeyword::Today,
        RangeKeyword::Yesterday,
        RangeKeyword::LastThreeDays,
        RangeKeyword::ThisWeek,
        RangeKeyword::LastWeek,
        RangeKeyword::ThisMonth,
        RangeKeyword::LastMonth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RangeKeyword::Today => "today",
            RangeKeyword::Yesterday => "yesterday",
            RangeKeyword::LastThreeDays => "last-3days",
            RangeKeyword::ThisWeek => "this-week",
            RangeKeyword::LastWeek => "last-week",
            RangeKeyword::ThisMonth => "this-month",
            RangeKeyword::LastMonth => "last-month",
        }
    }
}

impl fmt::Display for RangeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeKeyword {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeKeyword::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| CalendarError::InvalidKeyword(s.to_string()))
    }
}

/// Resolve a relative date keyword into the instant the report starts at.
///
/// All calendar arithmetic happens in `now`'s own time zone, so passing a
/// `DateTime<Local>` gives the user's wall-clock semantics and passing a
/// fixed offset gives reproducible results in tests. Unknown keywords are
/// rejected earlier, when the string is parsed into a [`RangeKeyword`].
pub fn resolve<Tz: TimeZone>(keyword: RangeKeyword, now: &DateTime<Tz>) -> Result<DateTime<Tz>, CalendarError> {
    let today = now.date_naive();
    let begin = match keyword {
        RangeKeyword::Today => Some(now.clone()),
        RangeKeyword::Yesterday => now.clone().checked_sub_days(Days::new(1)),
        RangeKeyword::LastThreeDays => now.clone().checked_sub_days(Days::new(3)),
        RangeKeyword::ThisWeek => monday_of(today).and_then(|d| local_midnight(&now.timezone(), d)),
        RangeKeyword::LastWeek => monday_of(today)
            .and_then(|d| d.checked_sub_days(Days::new(7)))
            .and_then(|d| local_midnight(&now.timezone(), d)),
        RangeKeyword::ThisMonth => first_of_month(today).and_then(|d| local_midnight(&now.timezone(), d)),
        RangeKeyword::LastMonth => first_of_month(today)
            .and_then(|d| d.checked_sub_months(Months::new(1)))
            .and_then(|d| local_midnight(&now.timezone(), d)),
    };
    begin.ok_or(CalendarError::Unrepresentable(keyword))
}

/// Monday on or before `date`; Sunday belongs to the week that started six days earlier.
fn monday_of(date: NaiveDate) -> Option<NaiveDate> {
    let offset = date.weekday().num_days_from_monday();
    date.checked_sub_days(Days::new(u64::from(offset)))
}

fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

/// Midnight of `date` in `tz`.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let midnight = tz.from_local_datetime(&date.and_hms_opt(0, 0, 0)?);
    pick_local(midnight, || tz.from_local_datetime(&date.and_hms_opt(1, 0, 0)?).earliest())
}

/// DST fall-back picks the earlier instant; a spring-forward gap at midnight uses 01:00.
fn pick_local<T>(at_midnight: LocalResult<T>, one_am: impl FnOnce() -> Option<T>) -> Option<T> {
    match at_midnight {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt),
        LocalResult::None => one_am(),
    }
}
