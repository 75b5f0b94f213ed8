use chrono::{DateTime, Utc};

/// Short calendar date, e.g. "Jan 1, 2023".
pub fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%b %-d, %Y").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// "5 minutes ago" style label relative to `now`; a week or older falls back
/// to [`format_date`]. Future timestamps read as "0 seconds ago".
pub fn relative_time(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - dt).num_seconds().max(0);
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    if secs < 60 {
        plural(secs, "second")
    } else if mins < 60 {
        plural(mins, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else {
        format_date(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(at(2023, 1, 1)), "Jan 1, 2023");
        assert_eq!(format_date(at(2024, 11, 23)), "Nov 23, 2024");
    }

    #[test]
    fn test_relative_time_units() {
        let now = at(2024, 6, 15);
        assert_eq!(relative_time(now - Duration::seconds(1), now), "1 second ago");
        assert_eq!(relative_time(now - Duration::seconds(59), now), "59 seconds ago");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(relative_time(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(relative_time(now - Duration::days(6), now), "6 days ago");
    }

    #[test]
    fn test_relative_time_falls_back_to_date() {
        let now = at(2024, 6, 15);
        assert_eq!(relative_time(at(2024, 6, 8), now), "Jun 8, 2024");
    }

    #[test]
    fn test_relative_time_future() {
        let now = at(2024, 6, 15);
        assert_eq!(relative_time(now + Duration::hours(3), now), "0 seconds ago");
    }
}
