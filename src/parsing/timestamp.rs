//! Timestamp parsing for transcript lines.
//!
//! Exports vary by phone locale, so the date part is tried against an ordered
//! list of [`DateFormat`] strategies and the first one that parses AND lands
//! inside the accepted calendar range wins. Ambiguous dates such as
//! `01/02/24` therefore resolve to the earlier strategy (US month/day).
//!
//! Time-of-day parsing is lenient: minutes and seconds overflow into the next
//! unit instead of failing, so `11:60 PM` reads as midnight of the next day.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use regex::Regex;

/// Whether a format expects an AM/PM marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    TwelveHour,
    TwentyFourHour,
}

/// Date-format strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `12/31/23, 11:59 PM`
    UsShortYear12h,
    /// `31/12/23, 11:59 PM`
    EuShortYear12h,
    /// `31/12/2023, 23:59`
    EuLongYear24h,
    /// `12/31/2023, 11:59 PM`
    UsLongYear12h,
    /// `31/12/2023, 11:59 PM`
    EuLongYear12h,
    /// `31/12/23, 23:59`
    EuShortYear24h,
    /// `12/31/23, 23:59`
    UsShortYear24h,
    /// `12/31/2023, 23:59`
    UsLongYear24h,
    /// `31.12.23, 23:59`
    EuDotShortYear24h,
    /// `31.12.2023, 23:59`
    EuDotLongYear24h,
    /// `31-12-2023, 23:59`
    EuDashLongYear24h,
    /// `2023-12-31, 23:59`
    Iso24h,
}

impl DateFormat {
    /// chrono pattern for the date part.
    pub fn date_pattern(self) -> &'static str {
        match self {
            DateFormat::UsShortYear12h | DateFormat::UsShortYear24h => "%m/%d/%y",
            DateFormat::EuShortYear12h | DateFormat::EuShortYear24h => "%d/%m/%y",
            DateFormat::EuLongYear24h | DateFormat::EuLongYear12h => "%d/%m/%Y",
            DateFormat::UsLongYear12h | DateFormat::UsLongYear24h => "%m/%d/%Y",
            DateFormat::EuDotShortYear24h => "%d.%m.%y",
            DateFormat::EuDotLongYear24h => "%d.%m.%Y",
            DateFormat::EuDashLongYear24h => "%d-%m-%Y",
            DateFormat::Iso24h => "%Y-%m-%d",
        }
    }

    /// Clock convention for the time part.
    pub fn clock(self) -> Clock {
        match self {
            DateFormat::UsShortYear12h
            | DateFormat::EuShortYear12h
            | DateFormat::UsLongYear12h
            | DateFormat::EuLongYear12h => Clock::TwelveHour,
            _ => Clock::TwentyFourHour,
        }
    }

    /// Returns all strategies in trial order.
    pub fn all() -> &'static [DateFormat] {
        &[
            DateFormat::UsShortYear12h,
            DateFormat::EuShortYear12h,
            DateFormat::EuLongYear24h,
            DateFormat::UsLongYear12h,
            DateFormat::EuLongYear12h,
            DateFormat::EuShortYear24h,
            DateFormat::UsShortYear24h,
            DateFormat::UsLongYear24h,
            DateFormat::EuDotShortYear24h,
            DateFormat::EuDotLongYear24h,
            DateFormat::EuDashLongYear24h,
            DateFormat::Iso24h,
        ]
    }
}

static CLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[:.](\d{2})(?:[:.](\d{2}))?(?:[\s\u{202F}\u{00A0}]*([AaPp])\.?\s?[Mm]\.?)?$")
        .expect("valid clock regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClockReading {
    hour: u32,
    minute: u32,
    second: u32,
    /// `Some(true)` for PM, `Some(false)` for AM.
    pm: Option<bool>,
}

fn read_clock(time_str: &str) -> Option<ClockReading> {
    let caps = CLOCK_PATTERN.captures(time_str.trim())?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    Some(ClockReading {
        hour: number(1)?,
        minute: number(2)?,
        second: number(3).unwrap_or(0),
        pm: caps
            .get(4)
            .map(|m| m.as_str().eq_ignore_ascii_case("p")),
    })
}

/// Seconds since midnight, or `None` if the reading does not fit `clock`.
fn seconds_of_day(reading: ClockReading, clock: Clock) -> Option<i64> {
    let hour = match (clock, reading.pm) {
        (Clock::TwelveHour, Some(pm)) if (1..=12).contains(&reading.hour) => {
            reading.hour % 12 + if pm { 12 } else { 0 }
        }
        (Clock::TwentyFourHour, None) if reading.hour <= 23 => reading.hour,
        _ => return None,
    };
    Some(i64::from(hour) * 3600 + i64::from(reading.minute) * 60 + i64::from(reading.second))
}

/// Parses `date_str` + `time_str`, trying every [`DateFormat`] in order.
///
/// Returns the timestamp and the strategy that produced it. Years outside
/// `min_year..=max_year` are rejected so that, for example, a 4-digit year
/// never satisfies a 2-digit-year pattern by accident.
pub fn parse_timestamp(
    date_str: &str,
    time_str: &str,
    min_year: i32,
    max_year: i32,
) -> Option<(DateTime<Utc>, DateFormat)> {
    let reading = read_clock(time_str)?;
    let date_str = date_str.trim();

    DateFormat::all().iter().find_map(|&format| {
        let offset = seconds_of_day(reading, format.clock())?;
        let date = NaiveDate::parse_from_str(date_str, format.date_pattern()).ok()?;
        if !(min_year..=max_year).contains(&date.year()) {
            return None;
        }
        let timestamp = date.and_time(NaiveTime::MIN) + Duration::seconds(offset);
        Some((timestamp.and_utc(), format))
    })
}
