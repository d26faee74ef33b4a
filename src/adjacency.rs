//! Adjacency scoring
//!
//! Scores how recently the person was seen before a given date: the count of
//! known attendance dates in the trailing window, normalized by the window
//! length. Recent streaks push the score toward 1.

use chrono::NaiveDate;

/// Default trailing window, in days
pub const DEFAULT_ADJACENCY_WINDOW_DAYS: i64 = 4;

/// Count known attendance dates falling 1 to `window_days` days (inclusive)
/// before `date`, divided by `window_days`.
///
/// Duplicate entries in `known` each count, so the score can exceed 1 for a
/// duplicated date list; it is deliberately not clamped. An empty `known`
/// list yields 0.
pub fn adjacent_visit_score(date: NaiveDate, known: &[NaiveDate], window_days: i64) -> f64 {
    debug_assert!(window_days > 0, "adjacency window must be positive");

    let hits = known
        .iter()
        .filter(|&&d| {
            let delta = (date - d).num_days();
            delta >= 1 && delta <= window_days
        })
        .count();

    hits as f64 / window_days as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_known_dates_score_zero() {
        assert_eq!(adjacent_visit_score(date(2020, 1, 10), &[], 4), 0.0);
        assert_eq!(adjacent_visit_score(date(2020, 1, 10), &[], 14), 0.0);
    }

    #[test]
    fn test_single_adjacent_date() {
        let known = [date(2020, 1, 9)];
        assert!((adjacent_visit_score(date(2020, 1, 10), &known, 4) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_date_outside_window_does_not_count() {
        let known = [date(2020, 1, 5)];
        assert_eq!(adjacent_visit_score(date(2020, 1, 10), &known, 4), 0.0);
    }

    #[test]
    fn test_window_bounds_inclusive() {
        // Both the 1-day and the window_days-day lookback count
        let known = [date(2020, 1, 9), date(2020, 1, 6)];
        assert!((adjacent_visit_score(date(2020, 1, 10), &known, 4) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_same_day_does_not_count() {
        let known = [date(2020, 1, 10)];
        assert_eq!(adjacent_visit_score(date(2020, 1, 10), &known, 4), 0.0);
    }

    #[test]
    fn test_duplicates_each_count_and_score_can_exceed_one() {
        let known = vec![date(2020, 1, 9); 6];
        let score = adjacent_visit_score(date(2020, 1, 10), &known, 4);
        assert!((score - 1.5).abs() < 1e-9);
    }
}
