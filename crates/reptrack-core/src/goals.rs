//! Daily rep goals and today's progress against them.
//!
//! At most one goal per exercise type exists at a time; exercise types are
//! compared through [`reptrack_storage::exercise_key`].

use anyhow::{bail, Result};
use chrono::NaiveDate;
use reptrack_storage::{exercise_key, DailyGoal, GoalProgress, WorkoutSession};

fn ensure_positive(target_reps: u32) -> Result<()> {
    if target_reps == 0 {
        bail!("Target reps must be a positive number");
    }
    Ok(())
}

/// Replace any goal for `exercise_type` with a new active one
///
/// # Errors
///
/// Returns an error if `target_reps` is zero
pub fn set_goal(
    goals: &mut Vec<DailyGoal>,
    exercise_type: &str,
    target_reps: u32,
) -> Result<DailyGoal> {
    ensure_positive(target_reps)?;

    goals.retain(|g| !g.tracks(exercise_type));
    let goal = DailyGoal::new(exercise_type.to_string(), target_reps);
    goals.push(goal.clone());
    Ok(goal)
}

/// Change the target of the goal with `id`. Returns `false` if there is no such goal.
///
/// # Errors
///
/// Returns an error if `target_reps` is zero
pub fn edit_goal(goals: &mut [DailyGoal], id: &str, target_reps: u32) -> Result<bool> {
    ensure_positive(target_reps)?;

    Ok(match goals.iter_mut().find(|g| g.id == id) {
        Some(goal) => {
            goal.target_reps = target_reps;
            true
        }
        None => false,
    })
}

/// Remove the goal with `id`. Returns `false` if there is no such goal.
pub fn reset_goal(goals: &mut Vec<DailyGoal>, id: &str) -> bool {
    let before = goals.len();
    goals.retain(|g| g.id != id);
    goals.len() != before
}

/// Reps logged on `today` for an exercise type, saturating at `u32::MAX`
#[must_use]
pub fn reps_on(sessions: &[WorkoutSession], exercise_type: &str, today: NaiveDate) -> u32 {
    let key = exercise_key(exercise_type);
    sessions
        .iter()
        .filter(|s| s.day() == today && exercise_key(&s.exercise_type) == key)
        .fold(0u32, |total, s| total.saturating_add(s.count))
}

fn progress_of(goal: &DailyGoal, sessions: &[WorkoutSession], today: NaiveDate) -> GoalProgress {
    let current_reps = reps_on(sessions, &goal.exercise_type, today);
    let progress = if goal.target_reps == 0 {
        100.0
    } else {
        (f64::from(current_reps) / f64::from(goal.target_reps) * 100.0).min(100.0)
    };

    GoalProgress {
        goal: goal.clone(),
        current_reps,
        progress,
        is_completed: current_reps >= goal.target_reps,
    }
}

/// Today's progress against the active goal for `exercise_type`, if there is one
#[must_use]
pub fn progress_for(
    goals: &[DailyGoal],
    sessions: &[WorkoutSession],
    exercise_type: &str,
    today: NaiveDate,
) -> Option<GoalProgress> {
    goals
        .iter()
        .find(|g| g.is_active && g.tracks(exercise_type))
        .map(|goal| progress_of(goal, sessions, today))
}

/// Progress for every active goal
#[must_use]
pub fn all_goals_progress(
    goals: &[DailyGoal],
    sessions: &[WorkoutSession],
    today: NaiveDate,
) -> Vec<GoalProgress> {
    goals
        .iter()
        .filter(|g| g.is_active)
        .filter_map(|g| progress_for(goals, sessions, &g.exercise_type, today))
        .collect()
}
