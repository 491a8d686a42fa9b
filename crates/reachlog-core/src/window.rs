//! Per-day query windows for the insights API.
//!
//! A window spans 00:00:00 through 23:59:59 of one calendar day in the
//! account's clock and is expressed in epoch seconds, which is what the
//! `since`/`until` query parameters expect.

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::date::CalendarDate;
use crate::error::FormatError;

const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => panic!("23:59:59 is a valid time of day"),
};

/// Longest local-time gap we step over when a wall-clock instant does not
/// exist (DST transitions are at most a few hours).
const MAX_GAP_MINUTES: i64 = 24 * 60;

/// Inclusive `[start, end]` bounds of a day, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: i64,
    pub end: i64,
}

/// The clock whose midnight defines a "day" for the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccountClock {
    /// The host's local time zone.
    #[default]
    Local,
    /// A fixed IANA time zone, e.g. `Europe/Madrid`.
    Zone(Tz),
}

impl AccountClock {
    /// Today's date on this clock.
    #[must_use]
    pub fn today(&self) -> CalendarDate {
        match self {
            Self::Local => CalendarDate::new(Local::now().date_naive()),
            Self::Zone(tz) => CalendarDate::new(Utc::now().with_timezone(tz).date_naive()),
        }
    }

    #[must_use]
    pub fn day_window(&self, date: CalendarDate) -> DayWindow {
        match self {
            Self::Local => window_in(&Local, date),
            Self::Zone(tz) => window_in(tz, date),
        }
    }
}

/// Parses a `dd/mm/yyyy` string and returns its window on `clock`.
///
/// # Errors
///
/// Returns [`FormatError`] if `date` is not a valid `dd/mm/yyyy` date.
pub fn day_window_for(date: &str, clock: &AccountClock) -> Result<DayWindow, FormatError> {
    let date = CalendarDate::parse(date)?;
    Ok(clock.day_window(date))
}

fn window_in<Z: TimeZone>(tz: &Z, date: CalendarDate) -> DayWindow {
    let day = date.as_naive();
    DayWindow {
        start: resolve(tz, day.and_time(NaiveTime::MIN), Bound::Start),
        end: resolve(tz, day.and_time(END_OF_DAY), Bound::End),
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// Maps a wall-clock instant to epoch seconds.
///
/// Ambiguous instants (clocks going back) resolve outward so the window covers
/// the whole day; non-existent ones (clocks going forward) move to the first
/// valid minute after the gap.
fn resolve<Z: TimeZone>(tz: &Z, naive: NaiveDateTime, bound: Bound) -> i64 {
    let mapped = tz.from_local_datetime(&naive);
    let picked = match bound {
        Bound::Start => mapped.earliest(),
        Bound::End => mapped.latest(),
    };
    if let Some(dt) = picked {
        return dt.timestamp();
    }

    let mut probe = naive;
    for _ in 0..MAX_GAP_MINUTES {
        probe += TimeDelta::minutes(1);
        if let Some(dt) = tz.from_local_datetime(&probe).earliest() {
            return dt.timestamp();
        }
    }
    naive.and_utc().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32, m: u32, y: i32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn utc_window_spans_whole_day() {
        let clock = AccountClock::Zone(chrono_tz::UTC);
        let window = clock.day_window(date(1, 6, 2025));
        assert_eq!(window.start, 1_748_736_000);
        assert_eq!(window.end, 1_748_736_000 + 86_399);
    }

    #[test]
    fn zone_offset_shifts_window() {
        let clock = AccountClock::Zone(chrono_tz::Europe::Madrid);
        let window = clock.day_window(date(1, 6, 2025));
        // CEST is UTC+2 in June.
        assert_eq!(window.start, 1_748_736_000 - 2 * 3_600);
        assert_eq!(window.end - window.start, 86_399);
    }

    #[test]
    fn window_start_never_after_end() {
        let clock = AccountClock::Zone(chrono_tz::America::New_York);
        let mut day = date(1, 1, 2025);
        for _ in 0..366 {
            let window = clock.day_window(day);
            assert!(window.start <= window.end, "bad window for {day}");
            day = CalendarDate::new(day.as_naive().succ_opt().unwrap());
        }
    }

    #[test]
    fn spring_forward_day_is_an_hour_short() {
        let clock = AccountClock::Zone(chrono_tz::America::New_York);
        let window = clock.day_window(date(9, 3, 2025));
        assert_eq!(window.end - window.start, 86_399 - 3_600);
    }

    #[test]
    fn midnight_gap_moves_start_forward() {
        // Santiago skips 00:00-01:00 local on the first Sunday of September.
        let clock = AccountClock::Zone(chrono_tz::America::Santiago);
        let window = clock.day_window(date(7, 9, 2025));
        assert!(window.start <= window.end);
        assert_eq!(window.end - window.start, 86_399 - 3_600);
    }

    #[test]
    fn local_clock_window_is_one_day_wide_or_dst_adjusted() {
        let window = AccountClock::Local.day_window(date(15, 7, 2025));
        let width = window.end - window.start;
        assert!((86_399 - 3_600..=86_399 + 3_600).contains(&width));
    }

    #[test]
    fn day_window_for_rejects_malformed_input() {
        let err = day_window_for("2025/06/01", &AccountClock::Local).unwrap_err();
        assert_eq!(err.input, "2025/06/01");
    }

    #[test]
    fn day_window_for_parses_text_date() {
        let clock = AccountClock::Zone(chrono_tz::UTC);
        let window = day_window_for("02/06/2025", &clock).unwrap();
        assert_eq!(window.start, 1_748_822_400);
    }
}
