use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime};
use derive_more::Display;

/// A configured time-of-day cutoff, e.g. the auto clock-out time.
///
/// Accepted forms: `"19"`, `"19:30"`, `"7:30 PM"` (period marker is
/// case-insensitive). Hour and minute are validated on parse, so resolving
/// onto a date cannot fail afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffTime {
    hour: u32,
    minute: u32,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display(fmt = "invalid time-of-day string")]
pub struct InvalidCutoff;

impl FromStr for CutoffTime {
    type Err = InvalidCutoff;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();

        let (hour, minute) = if lower.contains("am") || lower.contains("pm") {
            let mut parts = raw.split_whitespace();
            let time = parts.next().ok_or(InvalidCutoff)?;
            let period = parts.next().map(|p| p.to_ascii_lowercase());

            // Unparseable hour/minute fall back to 0, matching the lenient
            // handling the settings UI has always relied on.
            let mut nums = time.split(':');
            let h: u32 = nums
                .next()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let m: u32 = nums
                .next()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);

            let h = match period.as_deref() {
                Some("pm") if h != 12 => h + 12,
                Some("am") if h == 12 => 0,
                _ => h,
            };
            (h, m)
        } else if raw.contains(':') {
            let mut nums = raw.split(':');
            let h = nums
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or(InvalidCutoff)?;
            let m = nums
                .next()
                .and_then(|v| v.parse().ok())
                .ok_or(InvalidCutoff)?;
            (h, m)
        } else {
            let h = raw.parse().map_err(|_| InvalidCutoff)?;
            (h, 0)
        };

        if hour > 23 || minute > 59 {
            return Err(InvalidCutoff);
        }
        Ok(CutoffTime { hour, minute })
    }
}

impl CutoffTime {
    /// Concrete timestamp for this cutoff on the given calendar date.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(self.hour, self.minute, 0)
            .expect("hour and minute validated at parse")
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

/// Today as a local calendar date. Date-only columns are compared against
/// the local day, never the UTC one.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local wall-clock time without timezone.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Elapsed hours between a clock-in and a clock-out, rounded to 2 decimals.
/// `None` when the span is negative: that indicates a data error and the
/// record must be skipped rather than written.
pub fn elapsed_hours(clock_in: NaiveDateTime, clock_out: NaiveDateTime) -> Option<f64> {
    let ms = clock_out.signed_duration_since(clock_in).num_milliseconds();
    if ms < 0 {
        return None;
    }
    Some(round2(ms as f64 / 3_600_000.0))
}

/// Fixed-point rounding to 2 decimal places, the precision every hour/day
/// quantity is stored with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_12_hour_and_24_hour_to_same_cutoff() {
        let twelve: CutoffTime = "7:00 PM".parse().unwrap();
        let twenty_four: CutoffTime = "19:00".parse().unwrap();
        assert_eq!(twelve, twenty_four);
        assert_eq!(twelve.hour(), 19);
        assert_eq!(twelve.minute(), 0);
    }

    #[test]
    fn parses_bare_hour() {
        let cutoff: CutoffTime = "19".parse().unwrap();
        assert_eq!((cutoff.hour(), cutoff.minute()), (19, 0));
    }

    #[test]
    fn twelve_am_is_midnight_and_twelve_pm_is_noon() {
        let midnight: CutoffTime = "12:00 AM".parse().unwrap();
        assert_eq!(midnight.hour(), 0);
        let noon: CutoffTime = "12:00 pm".parse().unwrap();
        assert_eq!(noon.hour(), 12);
    }

    #[test]
    fn pm_marker_is_case_insensitive() {
        let a: CutoffTime = "7:30 pm".parse().unwrap();
        let b: CutoffTime = "7:30 PM".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!((a.hour(), a.minute()), (19, 30));
    }

    #[test]
    fn missing_minute_defaults_to_zero_in_12_hour_form() {
        let cutoff: CutoffTime = "7 PM".parse().unwrap();
        assert_eq!((cutoff.hour(), cutoff.minute()), (19, 0));
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert!("24:00".parse::<CutoffTime>().is_err());
        assert!("19:60".parse::<CutoffTime>().is_err());
        assert!("abc".parse::<CutoffTime>().is_err());
        assert!("".parse::<CutoffTime>().is_err());
    }

    #[test]
    fn resolves_on_a_date() {
        let cutoff: CutoffTime = "19:30".parse().unwrap();
        let ts = cutoff.on(date(2024, 3, 5));
        assert_eq!(ts, date(2024, 3, 5).and_hms_opt(19, 30, 0).unwrap());
    }

    #[test]
    fn elapsed_hours_rounds_to_two_decimals() {
        let day = date(2024, 1, 2);
        let clock_in = day.and_hms_opt(9, 0, 0).unwrap();
        let clock_out = day.and_hms_opt(17, 30, 0).unwrap();
        assert_eq!(elapsed_hours(clock_in, clock_out), Some(8.5));

        let clock_out = day.and_hms_opt(17, 20, 0).unwrap();
        assert_eq!(elapsed_hours(clock_in, clock_out), Some(8.33));
    }

    #[test]
    fn negative_span_is_a_data_error() {
        let day = date(2024, 1, 2);
        let clock_in = day.and_hms_opt(19, 0, 0).unwrap();
        let clock_out = day.and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(elapsed_hours(clock_in, clock_out), None);
    }

    #[test]
    fn zero_span_is_zero_hours() {
        let ts = date(2024, 1, 2).and_hms_opt(9, 0, 0).unwrap();
        assert_eq!(elapsed_hours(ts, ts), Some(0.0));
    }
}
