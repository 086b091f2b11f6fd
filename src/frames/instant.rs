//! Fixed-width partition keys derived from a resolved instant.
//!
//! Frames live at `<year>/<MMDDHH>/<MMSS>.jpg`. Every component is zero-padded,
//! so comparing the integers and comparing the strings give the same order.

use std::fmt;

use chrono::{DateTime, Datelike, Timelike, Utc};

/// Hour-granularity partition: the year plus the `MMDDHH` directory value.
///
/// Ordering is lexicographic on `(year, month_day_hour)`, which keeps hour
/// bounds monotonic across a New Year boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HourPartition {
    pub year: i32,
    pub month_day_hour: u32,
}

impl HourPartition {
    pub fn new(year: i32, month_day_hour: u32) -> Self {
        Self {
            year,
            month_day_hour,
        }
    }

    /// The `MMDDHH` directory name.
    pub fn folder_name(&self) -> String {
        format!("{:06}", self.month_day_hour)
    }
}

impl fmt::Display for HourPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:06}", self.year, self.month_day_hour)
    }
}

/// A calendar/time point at second precision, decomposed into partition keys.
///
/// `month` is stored as the value used on disk. With month-offset correction
/// enabled that is the zero-based month (`00`..`11`), otherwise `01`..`12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeInstant {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl TimeInstant {
    /// Decompose a UTC timestamp, dropping sub-second precision.
    pub fn from_utc(at: DateTime<Utc>, month_offset_correction: bool) -> Self {
        let month = if month_offset_correction {
            at.month0()
        } else {
            at.month()
        };

        Self {
            year: at.year(),
            month,
            day: at.day(),
            hour: at.hour(),
            minute: at.minute(),
            second: at.second(),
        }
    }

    /// `MMDDHH` as an integer.
    pub fn month_day_hour(&self) -> u32 {
        self.month * 10_000 + self.day * 100 + self.hour
    }

    pub fn hour_partition(&self) -> HourPartition {
        HourPartition::new(self.year, self.month_day_hour())
    }

    /// `MMSS` as an integer in `0..=5959`.
    pub fn minute_second(&self) -> u32 {
        self.minute * 100 + self.second
    }

    /// The year directory name.
    pub fn year_key(&self) -> String {
        format!("{:04}", self.year)
    }

    /// The `MMDD` prefix shared by all hour folders of this instant's day.
    pub fn month_day_key(&self) -> String {
        format!("{:02}{:02}", self.month, self.day)
    }

    pub fn month_day_hour_key(&self) -> String {
        format!("{:06}", self.month_day_hour())
    }

    pub fn minute_second_key(&self) -> String {
        format!("{:04}", self.minute_second())
    }
}

impl fmt::Display for TimeInstant {
    /// Renders as `YYYY MMDDHH MMSS`, the same keys the storage tree uses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.year_key(),
            self.month_day_hour_key(),
            self.minute_second_key()
        )
    }
}
