//! Time arithmetic shared by timers and the stopwatch

use chrono::{DateTime, Utc};

/// Total countdown length in seconds for an hours/minutes/seconds triple
pub fn parse_time_input(hours: u32, minutes: u32, seconds: u32) -> u64 {
    u64::from(hours) * 3600 + u64::from(minutes) * 60 + u64::from(seconds)
}

/// Whole seconds left until `end_time`, rounded up and floored at zero
pub fn remaining_seconds(end_time: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (end_time - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        ((millis + 999) / 1000) as u64
    }
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` once there is at least one hour
pub fn format_time(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Elapsed share of a countdown as a percentage
pub fn timer_progress(duration_seconds: u64, remaining: u64) -> f64 {
    if duration_seconds == 0 {
        return 0.0;
    }
    let elapsed = duration_seconds.saturating_sub(remaining);
    elapsed as f64 / duration_seconds as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parse_time_input_sums_units() {
        assert_eq!(parse_time_input(0, 5, 0), 300);
        assert_eq!(parse_time_input(1, 1, 1), 3661);
        assert_eq!(parse_time_input(0, 0, 0), 0);
    }

    #[test]
    fn remaining_rounds_partial_seconds_up() {
        let now = Utc::now();
        assert_eq!(remaining_seconds(now + Duration::milliseconds(1500), now), 2);
        assert_eq!(remaining_seconds(now + Duration::milliseconds(1000), now), 1);
        assert_eq!(remaining_seconds(now + Duration::milliseconds(1), now), 1);
    }

    #[test]
    fn remaining_is_zero_once_past_end() {
        let now = Utc::now();
        assert_eq!(remaining_seconds(now, now), 0);
        assert_eq!(remaining_seconds(now - Duration::hours(3), now), 0);
    }

    #[test]
    fn format_time_omits_zero_hours() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(299), "04:59");
        assert_eq!(format_time(3600), "01:00:00");
        assert_eq!(format_time(3725), "01:02:05");
    }

    #[test]
    fn progress_tracks_elapsed_share() {
        assert_eq!(timer_progress(300, 300), 0.0);
        assert_eq!(timer_progress(300, 150), 50.0);
        assert_eq!(timer_progress(300, 0), 100.0);
        assert_eq!(timer_progress(0, 0), 0.0);
    }
}
