use reptrack_storage::exercise_key;

/// Calories burned per minute of tracked time, on top of the per-rep estimate
const CALORIES_PER_MINUTE: f64 = 2.0;

/// Estimated calories burned by one repetition of an exercise
#[must_use]
pub fn calories_per_rep(exercise_type: &str) -> f64 {
    match exercise_key(exercise_type).as_str() {
        "pushups" => 0.5,
        "punches" => 0.3,
        // squats and anything unrecognised
        _ => 0.4,
    }
}

/// Calories for a finished workout: per-rep estimate plus a duration bonus, rounded
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn calculate_calories(exercise_type: &str, count: u32, duration_ms: u64) -> u32 {
    let base = f64::from(count) * calories_per_rep(exercise_type);
    let minutes = duration_ms as f64 / 60_000.0;
    (base + minutes * CALORIES_PER_MINUTE).round() as u32
}
