//! Human-readable distance between two instants, with an `in …` / `… ago` suffix.
//!
//! Thresholds (in rounded minutes):
//!
//! | Distance           | Words                                   |
//! |--------------------|-----------------------------------------|
//! | < 1                | `less than a minute`                    |
//! | 1                  | `1 minute`                              |
//! | < 45               | `N minutes`                             |
//! | < 90               | `about 1 hour`                          |
//! | < 1 day            | `about N hours`                         |
//! | < 42 hours         | `1 day`                                 |
//! | < 30 days          | `N days`                                |
//! | < 60 days          | `about 1 month` / `about 2 months`      |
//! | < 12 months        | `N months`                              |
//! | otherwise          | `about` / `over` / `almost` `N years`   |

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2520;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

/// Instant for a Unix timestamp in seconds; out-of-range values clamp to the epoch.
pub fn from_unix_seconds(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Describe `target` relative to `now`, e.g. `in 5 minutes` or `about 3 years ago`.
pub fn relative_to(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let (earlier, later) = if target <= now {
        (target, now)
    } else {
        (now, target)
    };
    let words = distance_in_words(earlier, later);
    if target > now {
        format!("in {words}")
    } else {
        format!("{words} ago")
    }
}

fn distance_in_words(earlier: DateTime<Utc>, later: DateTime<Utc>) -> String {
    let seconds = (later - earlier).num_seconds();
    let minutes = round_div(seconds, 60);

    if minutes < 2 {
        return if minutes == 0 {
            "less than a minute".to_string()
        } else {
            "1 minute".to_string()
        };
    }
    if minutes < 45 {
        return format!("{minutes} minutes");
    }
    if minutes < 90 {
        return "about 1 hour".to_string();
    }
    if minutes < MINUTES_IN_DAY {
        let hours = round_div(minutes, 60);
        return format!("about {hours} hours");
    }
    if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        return "1 day".to_string();
    }
    if minutes < MINUTES_IN_MONTH {
        let days = round_div(minutes, MINUTES_IN_DAY);
        return format!("{days} days");
    }
    if minutes < MINUTES_IN_TWO_MONTHS {
        let months = round_div(minutes, MINUTES_IN_MONTH);
        return plural("about", months, "month");
    }

    let months = calendar_months_between(earlier, later);
    if months < 12 {
        let nearest = round_div(minutes, MINUTES_IN_MONTH);
        return plural("", nearest, "month");
    }

    let years = months / 12;
    let remainder = months % 12;
    if remainder < 3 {
        plural("about", years, "year")
    } else if remainder < 9 {
        plural("over", years, "year")
    } else {
        plural("almost", years + 1, "year")
    }
}

fn plural(prefix: &str, count: i64, unit: &str) -> String {
    let s = if count == 1 { "" } else { "s" };
    if prefix.is_empty() {
        format!("{count} {unit}{s}")
    } else {
        format!("{prefix} {count} {unit}{s}")
    }
}

/// Round-half-up integer division for non-negative values.
fn round_div(value: i64, divisor: i64) -> i64 {
    (value + divisor / 2) / divisor
}

/// Whole calendar months from `earlier` to `later`.
fn calendar_months_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month()) - i64::from(earlier.month());
    let later_key = (later.day(), later.num_seconds_from_midnight());
    let earlier_key = (earlier.day(), earlier.num_seconds_from_midnight());
    if months > 0 && later_key < earlier_key {
        months -= 1;
    }
    months.max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    #[rstest]
    #[case(Duration::seconds(10), "less than a minute")]
    #[case(Duration::seconds(70), "1 minute")]
    #[case(Duration::minutes(5), "5 minutes")]
    #[case(Duration::minutes(50), "about 1 hour")]
    #[case(Duration::hours(5), "about 5 hours")]
    #[case(Duration::hours(30), "1 day")]
    #[case(Duration::days(10), "10 days")]
    #[case(Duration::days(40), "about 1 month")]
    #[case(Duration::days(150), "5 months")]
    fn past_distances(#[case] ago: Duration, #[case] words: &str) {
        assert_eq!(relative_to(now() - ago, now()), format!("{words} ago"));
    }

    #[test]
    fn future_instants_get_in_prefix() {
        assert_eq!(
            relative_to(now() + Duration::minutes(12), now()),
            "in 12 minutes"
        );
    }

    #[test]
    fn years_use_about_over_almost() {
        let base = now();
        let about = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        let over = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let almost = Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap();
        assert_eq!(relative_to(about, base), "about 2 years ago");
        assert_eq!(relative_to(over, base), "over 2 years ago");
        assert_eq!(relative_to(almost, base), "almost 3 years ago");
    }

    #[test]
    fn epoch_zero_is_defined() {
        let words = relative_to(from_unix_seconds(0), now());
        assert_eq!(words, "almost 57 years ago");
    }

    #[test]
    fn out_of_range_timestamp_clamps_to_epoch() {
        assert_eq!(from_unix_seconds(i64::MAX), DateTime::<Utc>::UNIX_EPOCH);
    }
}
