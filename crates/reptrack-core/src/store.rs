//! Workout store - owns the canonical session and goal lists.
//!
//! Both lists are mirrored to a [`KeyValueStore`] after every mutation, each
//! as a single JSON document. Persistence is best effort: read failures load
//! as empty lists and write failures are logged.

use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use reptrack_storage::{
    DailyGoal, DailyStats, GoalProgress, KeyValueStore, NewWorkoutSession, WeeklyProgress,
    WorkoutSession, GOALS_KEY, SESSIONS_KEY,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::goals;
use crate::stats::{HistoryWindow, StatsAggregator};

pub struct WorkoutStore {
    backend: Arc<dyn KeyValueStore>,
    sessions: Vec<WorkoutSession>,
    goals: Vec<DailyGoal>,
    daily_stats: Vec<DailyStats>,
    last_id: i64,
}

impl WorkoutStore {
    /// Read both collections from `backend` and derive the daily stats
    #[must_use]
    pub fn load(backend: Arc<dyn KeyValueStore>) -> Self {
        let sessions: Vec<WorkoutSession> = read_list(backend.as_ref(), SESSIONS_KEY);
        let goals: Vec<DailyGoal> = read_list(backend.as_ref(), GOALS_KEY);
        let last_id = sessions
            .iter()
            .filter_map(|s| s.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);

        log::debug!(
            "Loaded {} sessions and {} goals",
            sessions.len(),
            goals.len()
        );

        let mut store = Self {
            backend,
            sessions,
            goals,
            daily_stats: Vec::new(),
            last_id,
        };
        store.recompute_stats();
        store
    }

    // ==================== Sessions ====================

    /// Append a finished workout and return it with its new id
    pub fn save(&mut self, session: NewWorkoutSession) -> WorkoutSession {
        let session = session.with_id(self.next_id());
        self.sessions.push(session.clone());
        write_list(self.backend.as_ref(), SESSIONS_KEY, &self.sessions);
        self.recompute_stats();

        log::info!(
            "Saved workout {}: {} x{}",
            session.id,
            session.exercise_type,
            session.count
        );
        session
    }

    #[must_use]
    pub fn sessions(&self) -> &[WorkoutSession] {
        &self.sessions
    }

    /// Millisecond timestamp, bumped past the previous id when two saves share a millisecond
    fn next_id(&mut self) -> String {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }

    // ==================== Stats ====================

    fn recompute_stats(&mut self) {
        self.daily_stats = StatsAggregator::compute_daily_stats(&self.sessions);
    }

    /// Per-day stats, most recent first
    #[must_use]
    pub fn daily_stats(&self) -> &[DailyStats] {
        &self.daily_stats
    }

    #[must_use]
    pub fn weekly_progress(&self) -> WeeklyProgress {
        StatsAggregator::weekly_progress(&self.daily_stats)
    }

    #[must_use]
    pub fn today_stats(&self) -> DailyStats {
        self.stats_on(today())
    }

    #[must_use]
    pub fn stats_on(&self, day: NaiveDate) -> DailyStats {
        StatsAggregator::today_stats(&self.daily_stats, day)
    }

    #[must_use]
    pub fn history(&self, days: usize) -> HistoryWindow {
        StatsAggregator::history_window(&self.daily_stats, days)
    }

    // ==================== Goals ====================

    #[must_use]
    pub fn goals(&self) -> &[DailyGoal] {
        &self.goals
    }

    /// Set the daily target for an exercise type, replacing any previous goal for it
    ///
    /// # Errors
    ///
    /// Returns an error if `target_reps` is zero
    pub fn set_goal(&mut self, exercise_type: &str, target_reps: u32) -> Result<DailyGoal> {
        let goal = goals::set_goal(&mut self.goals, exercise_type, target_reps)?;
        write_list(self.backend.as_ref(), GOALS_KEY, &self.goals);
        log::info!("Goal set: {} x{}", goal.exercise_type, goal.target_reps);
        Ok(goal)
    }

    /// Change a goal's target. Returns `false` if no goal has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if `target_reps` is zero
    pub fn edit_goal(&mut self, id: &str, target_reps: u32) -> Result<bool> {
        let found = goals::edit_goal(&mut self.goals, id, target_reps)?;
        if found {
            write_list(self.backend.as_ref(), GOALS_KEY, &self.goals);
        }
        Ok(found)
    }

    /// Remove a goal. Returns `false` if no goal has that id.
    pub fn reset_goal(&mut self, id: &str) -> bool {
        let found = goals::reset_goal(&mut self.goals, id);
        if found {
            write_list(self.backend.as_ref(), GOALS_KEY, &self.goals);
        }
        found
    }

    #[must_use]
    pub fn progress_for(&self, exercise_type: &str) -> Option<GoalProgress> {
        self.progress_for_on(exercise_type, today())
    }

    #[must_use]
    pub fn progress_for_on(&self, exercise_type: &str, day: NaiveDate) -> Option<GoalProgress> {
        goals::progress_for(&self.goals, &self.sessions, exercise_type, day)
    }

    #[must_use]
    pub fn all_goals_progress(&self) -> Vec<GoalProgress> {
        self.all_goals_progress_on(today())
    }

    #[must_use]
    pub fn all_goals_progress_on(&self, day: NaiveDate) -> Vec<GoalProgress> {
        goals::all_goals_progress(&self.goals, &self.sessions, day)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn read_list<T: DeserializeOwned>(backend: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Failed to read {key}, starting empty: {e}");
            return Vec::new();
        }
    };

    let records: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(records) => records,
        Err(e) => {
            log::warn!("Stored {key} is not a JSON list, starting empty: {e}");
            return Vec::new();
        }
    };

    // A malformed record is skipped on its own; the rest still load
    let total = records.len();
    let items: Vec<T> = records
        .into_iter()
        .filter_map(|record| {
            serde_json::from_value(record)
                .map_err(|e| log::warn!("Skipping malformed record in {key}: {e}"))
                .ok()
        })
        .collect();

    if items.len() < total {
        log::warn!("Loaded {} of {total} records from {key}", items.len());
    }
    items
}

fn write_list<T: Serialize>(backend: &dyn KeyValueStore, key: &str, items: &[T]) {
    let result = serde_json::to_string(items)
        .map_err(anyhow::Error::from)
        .and_then(|json| backend.set(key, &json));

    if let Err(e) = result {
        log::warn!("Failed to persist {key}: {e}");
    }
}
