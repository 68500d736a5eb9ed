/// Data export command handlers
use anyhow::{bail, Result};
use reptrack_core::Config;
use reptrack_storage::WorkoutSession;
use std::fmt::Write;

use super::helpers::{escape_csv, open_store};

/// Sessions as CSV, one row per workout
pub fn sessions_csv(sessions: &[WorkoutSession]) -> String {
    let mut csv_content =
        String::from("id,date,exercise_type,count,duration_ms,form_score,calories\n");

    for session in sessions {
        let _ = writeln!(
            csv_content,
            "{},{},{},{},{},{},{}",
            escape_csv(&session.id),
            session.date.to_rfc3339(),
            escape_csv(&session.exercise_type),
            session.count,
            session.duration,
            session.form_score,
            session.calories,
        );
    }
    csv_content
}

pub fn handle_data_export(config: &Config, format: &str, output: Option<String>) -> Result<()> {
    let store = open_store(config)?;
    let sessions = store.sessions();
    let output_path = output.unwrap_or_else(|| format!("reptrack_export.{format}"));

    let content = match format {
        "json" => serde_json::to_string_pretty(sessions)?,
        "csv" => sessions_csv(sessions),
        _ => bail!("Unknown format: {format}. Use 'json' or 'csv'"),
    };

    std::fs::write(&output_path, content)?;
    println!("Exported {} workouts to {output_path}", sessions.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_sessions_csv() {
        let sessions = vec![WorkoutSession {
            id: "1717000000000".to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 29, 16, 26, 40).unwrap(),
            exercise_type: "Push-ups, wide".to_string(),
            count: 12,
            duration: 45_000,
            form_score: 88,
            calories: 8,
        }];

        let csv = sessions_csv(&sessions);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "1717000000000,2024-05-29T16:26:40+00:00,\"Push-ups, wide\",12,45000,88,8"
        );
    }

    #[test]
    fn test_sessions_csv_empty_has_header() {
        assert_eq!(sessions_csv(&[]).lines().count(), 1);
    }
}
