use chrono::NaiveDate;

// NOTE: the request form charges a half-day as one full day against the
// remaining balance, while approval deducts 0.5. The two constants are kept
// separate on purpose until product signs off on a single value; unifying
// them changes observable balance math.
const HALF_DAY_ON_APPROVAL: f64 = 0.5;
const HALF_DAY_ON_REQUEST: f64 = 1.0;

/// Days deducted from the balance when a request is approved.
/// Inclusive of both endpoints: a single-day request counts as 1.
pub fn approved_leave_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> f64 {
    if half_day {
        return HALF_DAY_ON_APPROVAL;
    }
    end.signed_duration_since(start).num_days().abs() as f64 + 1.0
}

/// Days a request is counted as when validating it against the remaining
/// balance. Can be zero or negative for an inverted range; callers reject
/// anything that is not strictly positive.
pub fn requested_leave_days(start: NaiveDate, end: NaiveDate, half_day: bool) -> f64 {
    if half_day {
        return HALF_DAY_ON_REQUEST;
    }
    end.signed_duration_since(start).num_days() as f64 + 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_counts_as_one() {
        let day = date(2024, 1, 1);
        assert_eq!(approved_leave_days(day, day, false), 1.0);
        assert_eq!(requested_leave_days(day, day, false), 1.0);
    }

    #[test]
    fn range_is_inclusive_of_both_endpoints() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 5);
        assert_eq!(approved_leave_days(start, end, false), 5.0);
        assert_eq!(requested_leave_days(start, end, false), 5.0);
    }

    #[test]
    fn half_day_overrides_the_range() {
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 5);
        assert_eq!(approved_leave_days(start, end, true), 0.5);
        assert_eq!(requested_leave_days(start, end, true), 1.0);
    }

    #[test]
    fn inverted_range_validates_as_non_positive_on_request() {
        let start = date(2024, 1, 5);
        let end = date(2024, 1, 1);
        assert!(requested_leave_days(start, end, false) <= 0.0);
        // the approval path takes the absolute span instead
        assert_eq!(approved_leave_days(start, end, false), 5.0);
    }
}
