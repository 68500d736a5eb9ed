
use chrono::NaiveDate;
use reptrack_storage::{DailyStats, WeeklyProgress, WorkoutSession};
use std::collections::BTreeMap;

/// Number of most recent days summed by [`StatsAggregator::weekly_progress`]
pub const WEEK_DAYS: usize = 7;

/// Daily entries for a chart, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryWindow {
    pub days: Vec<DailyStats>,
    /// Largest `total_reps` in the window, never below 1 so bars can be scaled
    pub max_reps: u32,
}

#[derive(Default)]
struct DayAccumulator {
    workouts: u32,
    reps: u64,
    duration: u64,
    form_score_sum: u64,
    calories: u64,
}

/// Derives aggregate statistics from workout sessions
pub struct StatsAggregator;

impl StatsAggregator {
    /// One entry per distinct calendar date, most recent first
    #[must_use]
    pub fn compute_daily_stats(sessions: &[WorkoutSession]) -> Vec<DailyStats> {
        let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

        for session in sessions {
            let day = days.entry(session.day()).or_default();
            day.workouts = day.workouts.saturating_add(1);
            day.reps = day.reps.saturating_add(u64::from(session.count));
            day.duration = day.duration.saturating_add(session.duration);
            day.form_score_sum = day.form_score_sum.saturating_add(u64::from(session.form_score));
            day.calories = day.calories.saturating_add(u64::from(session.calories));
        }

        days.into_iter()
            .rev()
            .map(|(date, day)| DailyStats {
                date,
                total_workouts: day.workouts,
                total_reps: saturate(day.reps),
                total_duration: day.duration,
                avg_form_score: rounded_mean(day.form_score_sum, day.workouts),
                calories: saturate(day.calories),
            })
            .collect()
    }

    /// Sum of the most recent seven entries (or fewer, if that is all there is)
    ///
    /// `daily_stats` must be sorted most recent first, as produced by
    /// [`Self::compute_daily_stats`].
    #[must_use]
    pub fn weekly_progress(daily_stats: &[DailyStats]) -> WeeklyProgress {
        let week = &daily_stats[..daily_stats.len().min(WEEK_DAYS)];

        let form_score_sum: u64 = week.iter().map(|d| u64::from(d.avg_form_score)).sum();
        let days = u32::try_from(week.len()).unwrap_or(u32::MAX);

        WeeklyProgress {
            total_workouts: sum_u32(week.iter().map(|d| d.total_workouts)),
            total_reps: sum_u32(week.iter().map(|d| d.total_reps)),
            total_duration: week
                .iter()
                .fold(0u64, |total, d| total.saturating_add(d.total_duration)),
            avg_form_score: rounded_mean(form_score_sum, days),
            total_calories: sum_u32(week.iter().map(|d| d.calories)),
        }
    }

    /// Stats for `today`, or all-zero stats carrying today's date
    #[must_use]
    pub fn today_stats(daily_stats: &[DailyStats], today: NaiveDate) -> DailyStats {
        daily_stats
            .iter()
            .find(|d| d.date == today)
            .cloned()
            .unwrap_or_else(|| DailyStats::empty(today))
    }

    /// The most recent `days` entries in chronological order
    #[must_use]
    pub fn history_window(daily_stats: &[DailyStats], days: usize) -> HistoryWindow {
        let mut window: Vec<DailyStats> = daily_stats.iter().take(days).cloned().collect();
        window.reverse();

        let max_reps = window.iter().map(|d| d.total_reps).max().unwrap_or(0).max(1);

        HistoryWindow {
            days: window,
            max_reps,
        }
    }
}

/// Narrow a running total, clamping at `u32::MAX`
fn saturate(total: u64) -> u32 {
    u32::try_from(total).unwrap_or(u32::MAX)
}

fn sum_u32(values: impl Iterator<Item = u32>) -> u32 {
    saturate(values.map(u64::from).sum())
}

/// `round(sum / count)`, treating an empty set as a divisor of 1
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn rounded_mean(sum: u64, count: u32) -> u32 {
    let divisor = f64::from(count.max(1));
    (sum as f64 / divisor).round() as u32
}
