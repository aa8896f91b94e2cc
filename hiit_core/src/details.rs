//! Parsing of the free-text exercise details column.
//!
//! A details string such as "30s hold" or "45 sec plank" marks a timed
//! exercise. Anything without a seconds marker ("10 reps", "3 sets") is
//! rep-based and only advances on confirmation.

use once_cell::sync::Lazy;
use regex::Regex;

static SECONDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:seconds|second|secs|sec|s)\b")
        .expect("seconds pattern is valid")
});

/// How an exercise is driven
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drive {
    /// Counts down the given seconds, then advances by itself
    Timed(u32),
    /// Waits for the user to confirm the set
    Reps,
}

/// Seconds encoded in a details string, if any. Zero counts as none.
pub fn timed_seconds(details: &str) -> Option<u32> {
    SECONDS_RE
        .captures(details)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|secs| *secs > 0)
}

/// Classify an exercise by its details text
pub fn drive_for(details: &str) -> Drive {
    match timed_seconds(details) {
        Some(secs) => Drive::Timed(secs),
        None => Drive::Reps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_hold() {
        assert_eq!(drive_for("30s hold"), Drive::Timed(30));
        assert_eq!(timed_seconds("45 s"), Some(45));
        assert_eq!(timed_seconds("Plank 60 sec"), Some(60));
        assert_eq!(timed_seconds("20 Seconds each side"), Some(20));
    }

    #[test]
    fn test_rep_based() {
        assert_eq!(drive_for("10 reps"), Drive::Reps);
        assert_eq!(drive_for("3 sets of 8"), Drive::Reps);
        assert_eq!(drive_for("12 squats"), Drive::Reps);
        assert_eq!(drive_for(""), Drive::Reps);
    }

    #[test]
    fn test_zero_seconds_is_not_timed() {
        assert_eq!(timed_seconds("0s"), None);
    }

    #[test]
    fn test_first_duration_wins() {
        assert_eq!(timed_seconds("20s on, 10s off"), Some(20));
    }
}
