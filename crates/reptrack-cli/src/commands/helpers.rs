//! Helper utility functions for CLI commands

use std::sync::Arc;

use anyhow::{Context, Result};
use reptrack_core::{Config, WorkoutStore};
use reptrack_storage::Database;

/// Open the configured database and load the workout store from it
pub fn open_store(config: &Config) -> Result<WorkoutStore> {
    let db = Database::new(config.storage.db_path.clone()).context("Failed to open database")?;
    Ok(WorkoutStore::load(Arc::new(db)))
}

/// Heavy horizontal rule for section headings
pub fn rule(width: usize) -> String {
    "\u{2550}".repeat(width)
}

/// Escape a string for CSV format
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Convert a duration given in seconds to milliseconds, rejecting values that do not fit
pub fn duration_ms_from_secs(secs: u64) -> Result<u64> {
    secs.checked_mul(1000)
        .with_context(|| format!("Duration of {secs}s is too large"))
}

/// Render elapsed milliseconds as `1h 02m 03s`, `2m 05s` or `42s`
pub fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds:02}s")
    } else {
        format!("{seconds}s")
    }
}

/// Fixed-width bar for `value` out of `max`
pub fn bar(value: u32, max: u32, width: usize) -> String {
    let max = max.max(1);
    let scaled = u64::from(value.min(max)) * u64::try_from(width).unwrap_or(0) / u64::from(max);
    let filled = usize::try_from(scaled).unwrap_or(width).min(width);
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv_no_special() {
        assert_eq!(escape_csv("Push-ups"), "Push-ups");
    }

    #[test]
    fn test_escape_csv_comma() {
        assert_eq!(escape_csv("squats, deep"), "\"squats, deep\"");
    }

    #[test]
    fn test_escape_csv_quote() {
        assert_eq!(escape_csv("say \"hello\""), "\"say \"\"hello\"\"\"");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(42_999), "42s");
        assert_eq!(format_duration(125_000), "2m 05s");
        assert_eq!(format_duration(3_723_000), "1h 02m 03s");
    }

    #[test]
    fn test_duration_ms_from_secs() {
        assert_eq!(duration_ms_from_secs(0).unwrap(), 0);
        assert_eq!(duration_ms_from_secs(45).unwrap(), 45_000);
    }

    #[test]
    fn test_duration_ms_from_secs_rejects_overflow() {
        assert!(duration_ms_from_secs(u64::MAX).is_err());
        assert!(duration_ms_from_secs(u64::MAX / 1000 + 1).is_err());
        assert!(duration_ms_from_secs(u64::MAX / 1000).is_ok());
    }

    #[test]
    fn test_bar_scales_to_width() {
        assert_eq!(bar(5, 10, 10), "#####.....");
        assert_eq!(bar(10, 10, 4), "####");
        assert_eq!(bar(0, 0, 3), "...");
    }

    #[test]
    fn test_bar_never_overflows() {
        assert_eq!(bar(50, 10, 5), "#####");
    }
}
