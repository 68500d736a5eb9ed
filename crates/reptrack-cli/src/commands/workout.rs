/// Workout logging and statistics command handlers
use anyhow::{bail, Result};
use chrono::Utc;
use reptrack_core::{calculate_calories, Config, WorkoutStore};
use reptrack_storage::{DailyStats, GoalProgress, NewWorkoutSession, WorkoutSession};
use tabled::{Table, Tabled};

use super::helpers::{bar, duration_ms_from_secs, format_duration, open_store, rule};

const CHART_WIDTH: usize = 30;

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Exercise")]
    exercise: String,
    #[tabled(rename = "Reps")]
    reps: u32,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Form")]
    form: String,
    #[tabled(rename = "Calories")]
    calories: u32,
}

impl From<&WorkoutSession> for SessionRow {
    fn from(session: &WorkoutSession) -> Self {
        Self {
            id: session.id.clone(),
            date: session.date.format("%Y-%m-%d %H:%M").to_string(),
            exercise: session.exercise_type.clone(),
            reps: session.count,
            duration: format_duration(session.duration),
            form: format!("{}%", session.form_score),
            calories: session.calories,
        }
    }
}

pub fn handle_log(
    config: &Config,
    exercise: &str,
    reps: u32,
    duration_secs: u64,
    form_score: u32,
) -> Result<()> {
    if reps == 0 {
        bail!("A workout needs at least one rep");
    }

    let duration = duration_ms_from_secs(duration_secs)?;
    let mut store = open_store(config)?;
    let now = Utc::now();
    let session = store.save(NewWorkoutSession {
        date: now,
        exercise_type: exercise.to_string(),
        count: reps,
        duration,
        form_score,
        calories: calculate_calories(exercise, reps, duration),
    });

    println!(
        "Logged {} x{} ({}, {} kcal)",
        session.exercise_type,
        session.count,
        format_duration(session.duration),
        session.calories
    );
    print_goal_line(&store, exercise);
    Ok(())
}

pub fn handle_history(config: &Config, limit: usize) -> Result<()> {
    let store = open_store(config)?;
    let sessions = store.sessions();

    if sessions.is_empty() {
        println!("No workouts recorded yet");
        return Ok(());
    }

    let rows: Vec<SessionRow> = sessions
        .iter()
        .rev()
        .take(limit)
        .map(SessionRow::from)
        .collect();

    println!("\nRecent Workouts");
    println!("{}", rule(28));
    println!("{}", Table::new(rows));
    if sessions.len() > limit {
        println!("({} of {} shown)", limit, sessions.len());
    }
    Ok(())
}

pub fn handle_stats(config: &Config, days: usize) -> Result<()> {
    let store = open_store(config)?;
    let window = store.history(days);

    if window.days.is_empty() {
        println!("No workouts recorded yet");
        return Ok(());
    }

    println!("\nReps per Day (last {days} active days)");
    println!("{}", rule(40));
    for day in &window.days {
        println!(
            "{}  {}  {:>5} reps  {:>3}% form",
            day.date.format("%a %m-%d"),
            bar(day.total_reps, window.max_reps, CHART_WIDTH),
            day.total_reps,
            day.avg_form_score
        );
    }
    Ok(())
}

pub fn handle_today(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let today = store.today_stats();

    println!("\nToday ({})", today.date);
    println!("{}", rule(28));
    print_day(&today);

    let progress = store.all_goals_progress();
    if !progress.is_empty() {
        println!("\nGoals");
        for p in &progress {
            print_progress(p);
        }
    }
    Ok(())
}

pub fn handle_week(config: &Config) -> Result<()> {
    let store = open_store(config)?;
    let weekly = store.weekly_progress();

    println!("\nWeekly Progress (last 7 active days)");
    println!("{}", rule(28));
    println!("Workouts:        {}", weekly.total_workouts);
    println!("Total reps:      {}", weekly.total_reps);
    println!("Time:            {}", format_duration(weekly.total_duration));
    println!("Avg form score:  {}%", weekly.avg_form_score);
    println!("Calories:        {}", weekly.total_calories);
    Ok(())
}

fn print_day(stats: &DailyStats) {
    println!("Workouts:        {}", stats.total_workouts);
    println!("Reps:            {}", stats.total_reps);
    println!("Time:            {}", format_duration(stats.total_duration));
    println!("Avg form score:  {}%", stats.avg_form_score);
    println!("Calories:        {}", stats.calories);
}

/// One line of goal progress, e.g. `pushups  [#####.....]  10/20 (50%)`
pub fn print_progress(progress: &GoalProgress) {
    let done = if progress.is_completed { "  done" } else { "" };
    println!(
        "  {:<12} [{}] {}/{} ({:.0}%){done}",
        progress.goal.exercise_type,
        bar(progress.current_reps, progress.goal.target_reps, 20),
        progress.current_reps,
        progress.goal.target_reps,
        progress.progress
    );
}

/// Goal progress after a save, when the exercise has a goal
pub fn print_goal_line(store: &WorkoutStore, exercise: &str) {
    if let Some(progress) = store.progress_for(exercise) {
        print_progress(&progress);
    }
}
