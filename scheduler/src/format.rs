//! Human-readable rendering of the time remaining until the next reset.

/// Render a duration as "H hours, M minutes, S seconds", joining only the
/// non-zero parts. Zero renders as "0 seconds".
pub fn pretty_time_remaining(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours} hours"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes} minutes"));
    }
    if seconds > 0 {
        parts.push(format!("{seconds} seconds"));
    }

    if parts.is_empty() {
        return "0 seconds".to_string();
    }
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::pretty_time_remaining;

    #[test]
    fn all_parts() {
        assert_eq!(
            pretty_time_remaining(3 * 3600 + 25 * 60 + 7),
            "3 hours, 25 minutes, 7 seconds"
        );
    }

    #[test]
    fn zero_parts_are_skipped() {
        assert_eq!(pretty_time_remaining(3600), "1 hours");
        assert_eq!(pretty_time_remaining(61), "1 minutes, 1 seconds");
        assert_eq!(pretty_time_remaining(59), "59 seconds");
    }

    #[test]
    fn zero_duration() {
        assert_eq!(pretty_time_remaining(0), "0 seconds");
    }
}
