pub mod db;
pub mod kv;
pub mod migrations;
pub mod models;

pub use db::Database;
pub use kv::{KeyValueStore, MemoryStore, GOALS_KEY, SESSIONS_KEY};
pub use models::{
    exercise_key, DailyGoal, DailyStats, GoalProgress, NewWorkoutSession, WeeklyProgress,
    WorkoutSession,
};
