// Calendar granularity and bucket comparison
use super::error::DomainError;
use chrono::{Datelike, NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Calendar unit used as a bucket width, ordered coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
}

/// Calendar fields of a timestamp at or above some granularity; the finer
/// fields are zeroed so that comparing buckets compares only what matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarBucket {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    millisecond: u32,
}

impl Granularity {
    pub const ALL: [Granularity; 7] = [
        Granularity::Year,
        Granularity::Month,
        Granularity::Day,
        Granularity::Hour,
        Granularity::Minute,
        Granularity::Second,
        Granularity::Millisecond,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Day => "day",
            Granularity::Hour => "hour",
            Granularity::Minute => "minute",
            Granularity::Second => "second",
            Granularity::Millisecond => "millisecond",
        }
    }

    /// Truncate `ts` to this granularity.
    pub fn bucket(&self, ts: &NaiveDateTime) -> CalendarBucket {
        let keep = |unit: Granularity, value: u32| if *self >= unit { value } else { 0 };
        CalendarBucket {
            year: ts.year(),
            month: keep(Granularity::Month, ts.month()),
            day: keep(Granularity::Day, ts.day()),
            hour: keep(Granularity::Hour, ts.hour()),
            minute: keep(Granularity::Minute, ts.minute()),
            second: keep(Granularity::Second, ts.second()),
            millisecond: keep(Granularity::Millisecond, ts.nanosecond() / 1_000_000),
        }
    }

    /// True when `a` falls in the same bucket as `b` or an earlier one.
    pub fn is_same_or_before(&self, a: &NaiveDateTime, b: &NaiveDateTime) -> bool {
        self.bucket(a) <= self.bucket(b)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Granularity::ALL
            .into_iter()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| {
                DomainError::invalid(
                    "granularity",
                    format!(
                        "'{}' is not one of year, month, day, hour, minute, second, millisecond",
                        s
                    ),
                )
            })
    }
}
