use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Normalized comparison key for a free-text exercise label.
///
/// `"Push-ups"`, `"push ups"` and `"pushups"` all map to `"pushups"`.
/// Letters and digits of any script are kept; a label with none of them
/// falls back to its trimmed, lowercased text.
#[must_use]
pub fn exercise_key(label: &str) -> String {
    let key: String = label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    if key.is_empty() {
        label.trim().to_lowercase()
    } else {
        key
    }
}

/// Accepts fractional scores (older clients stored one decimal place)
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn deserialize_form_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let score = f64::deserialize(deserializer)?;
    if score.is_nan() {
        return Ok(0);
    }
    Ok(score.round().clamp(0.0, 100.0) as u32)
}

/// One completed tracked workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub date: DateTime<Utc>,
    pub exercise_type: String,
    pub count: u32,
    /// Elapsed milliseconds
    pub duration: u64,
    /// Percentage, 0-100
    #[serde(deserialize_with = "deserialize_form_score")]
    pub form_score: u32,
    pub calories: u32,
}

/// A workout waiting for an id, as handed to the session store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutSession {
    pub date: DateTime<Utc>,
    pub exercise_type: String,
    pub count: u32,
    pub duration: u64,
    pub form_score: u32,
    pub calories: u32,
}

impl NewWorkoutSession {
    #[must_use]
    pub fn with_id(self, id: String) -> WorkoutSession {
        WorkoutSession {
            id,
            date: self.date,
            exercise_type: self.exercise_type,
            count: self.count,
            duration: self.duration,
            form_score: self.form_score,
            calories: self.calories,
        }
    }
}

impl WorkoutSession {
    /// Calendar day this session counts towards (UTC)
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Aggregate over every session sharing a calendar date. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_workouts: u32,
    pub total_reps: u32,
    pub total_duration: u64,
    pub avg_form_score: u32,
    pub calories: u32,
}

impl DailyStats {
    /// All-zero stats for a day without sessions
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total_workouts: 0,
            total_reps: 0,
            total_duration: 0,
            avg_form_score: 0,
            calories: 0,
        }
    }
}

/// Totals over the most recent (up to) seven days with activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyProgress {
    pub total_workouts: u32,
    pub total_reps: u32,
    pub total_duration: u64,
    pub avg_form_score: u32,
    pub total_calories: u32,
}

/// Per-exercise daily rep target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGoal {
    pub id: String,
    pub exercise_type: String,
    pub target_reps: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl DailyGoal {
    #[must_use]
    pub fn new(exercise_type: String, target_reps: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            exercise_type,
            target_reps,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Whether this goal tracks the given exercise label
    #[must_use]
    pub fn tracks(&self, exercise_type: &str) -> bool {
        exercise_key(&self.exercise_type) == exercise_key(exercise_type)
    }
}

/// Today's progress against one active goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal: DailyGoal,
    pub current_reps: u32,
    /// Percentage of the target reached, capped at 100
    pub progress: f64,
    pub is_completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_key_normalizes_labels() {
        assert_eq!(exercise_key("Push-ups"), "pushups");
        assert_eq!(exercise_key("push ups"), "pushups");
        assert_eq!(exercise_key("SQUATS"), "squats");
        assert_eq!(exercise_key(""), "");
    }

    #[test]
    fn test_exercise_key_keeps_non_ascii_labels_apart() {
        let pushups = "\u{41e}\u{442}\u{436}\u{438}\u{43c}\u{430}\u{43d}\u{438}\u{44f}";
        let squats = "\u{41f}\u{440}\u{438}\u{441}\u{435}\u{434}\u{430}\u{43d}\u{438}\u{44f}";

        assert!(!exercise_key(pushups).is_empty());
        assert_ne!(exercise_key(pushups), exercise_key(squats));
        assert_eq!(exercise_key(&pushups.to_uppercase()), exercise_key(pushups));
    }

    #[test]
    fn test_exercise_key_punctuation_only_labels_stay_distinct() {
        assert_eq!(exercise_key(" !!! "), "!!!");
        assert_ne!(exercise_key("!!!"), exercise_key("???"));
    }

    #[test]
    fn test_goal_tracks_normalized_exercise() {
        let goal = DailyGoal::new("pushups".to_string(), 20);
        assert!(goal.is_active);
        assert!(goal.tracks("Push-ups"));
        assert!(!goal.tracks("Squats"));
    }

    #[test]
    fn test_session_serializes_camel_case() {
        let session = NewWorkoutSession {
            date: "2024-03-01T10:15:00Z".parse().unwrap(),
            exercise_type: "Squats".to_string(),
            count: 12,
            duration: 45_000,
            form_score: 90,
            calories: 6,
        }
        .with_id("1709288100000".to_string());

        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["exerciseType"], "Squats");
        assert_eq!(json["formScore"], 90);
        assert_eq!(session.day(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_session_reads_browser_timestamp_format() {
        let raw = r#"{"id":"1","date":"2024-03-01T23:59:59.123Z","exerciseType":"Punches",
            "count":30,"duration":60000,"formScore":80,"calories":11}"#;
        let session: WorkoutSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.day(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(session.count, 30);
    }

    #[test]
    fn test_session_reads_fractional_form_score() {
        let raw = r#"{"id":"2","date":"2024-03-01T10:00:00Z","exerciseType":"Squats",
            "count":10,"duration":30000,"formScore":87.6,"calories":5}"#;
        let session: WorkoutSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.form_score, 88);
    }
}
