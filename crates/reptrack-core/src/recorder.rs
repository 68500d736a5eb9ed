//! Workout recorder - the capture loop around the frame relay.
//!
//! A recording submits frames on a fixed interval and keeps the latest
//! reading. Only one frame is in flight at a time; ticks that arrive while a
//! frame is outstanding are dropped. Stopping turns the last reading into a
//! session, provided at least one rep was counted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use reptrack_detector::{FrameReading, FrameRequest, FrameSubmitter};
use reptrack_storage::NewWorkoutSession;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::calories::calculate_calories;

/// Outcome of [`Recorder::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    /// The finished workout, `None` if no reps were counted
    pub session: Option<NewWorkoutSession>,
    pub frames_submitted: u32,
    pub frames_dropped: u32,
    pub frames_failed: u32,
}

/// Marks a frame as in flight until dropped
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

fn idle_reading() -> FrameReading {
    FrameReading {
        count: 0,
        form_score: 0,
        state: "ready".to_string(),
        timestamp: 0,
    }
}

pub struct Recorder {
    exercise_type: String,
    started_at: Option<DateTime<Utc>>,
    reading: FrameReading,
    in_flight: Arc<AtomicBool>,
}

impl Recorder {
    #[must_use]
    pub fn new(exercise_type: impl Into<String>) -> Self {
        Self {
            exercise_type: exercise_type.into(),
            started_at: None,
            reading: idle_reading(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn exercise_type(&self) -> &str {
        &self.exercise_type
    }

    #[must_use]
    pub fn is_recording(&self) -> bool {
        self.started_at.is_some()
    }

    /// Latest reading of the current recording
    #[must_use]
    pub fn reading(&self) -> &FrameReading {
        &self.reading
    }

    /// Begin a recording, clearing the previous reading
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.started_at = Some(now);
        self.reading = idle_reading();
        log::info!("Recording {} started", self.exercise_type);
    }

    /// Replace the current reading. Ignored when not recording.
    pub fn apply(&mut self, reading: FrameReading) {
        if self.is_recording() {
            self.reading = reading;
        }
    }

    /// Claim the single in-flight slot, or `None` if a frame is already outstanding
    #[must_use]
    pub fn try_begin_frame(&self) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: Arc::clone(&self.in_flight),
            })
    }

    /// End the recording. Returns the workout to save if any reps were counted.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Option<NewWorkoutSession> {
        let started_at = self.started_at.take()?;
        let reading = std::mem::replace(&mut self.reading, idle_reading());

        if reading.count == 0 {
            log::info!("Recording {} stopped without reps", self.exercise_type);
            return None;
        }

        let duration = u64::try_from((now - started_at).num_milliseconds()).unwrap_or(0);
        Some(NewWorkoutSession {
            date: now,
            exercise_type: self.exercise_type.clone(),
            count: reading.count,
            duration,
            form_score: reading.form_score,
            calories: calculate_calories(&self.exercise_type, reading.count, duration),
        })
    }

    fn handle_result(&mut self, result: Result<FrameReading>, summary: &mut RecordingSummary) {
        match result {
            Ok(reading) => {
                log::debug!(
                    "{}: count={} form={} state={}",
                    self.exercise_type,
                    reading.count,
                    reading.form_score,
                    reading.state
                );
                self.apply(reading);
            }
            Err(e) => {
                summary.frames_failed += 1;
                log::warn!("Frame submission failed: {e}");
            }
        }
    }

    /// Record a whole workout from a sequence of frames (base64 JPEG data)
    ///
    /// One frame is taken per tick of `interval`. Each submission runs as its
    /// own task; while one is outstanding further ticks drop their frame.
    pub async fn run(
        &mut self,
        frames: Vec<String>,
        submitter: Arc<dyn FrameSubmitter>,
        interval: Duration,
    ) -> RecordingSummary {
        let mut summary = RecordingSummary {
            session: None,
            frames_submitted: 0,
            frames_dropped: 0,
            frames_failed: 0,
        };

        self.start(Utc::now());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = frames.into_iter();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(image_data) = frames.next() else {
                        break;
                    };

                    let Some(guard) = self.try_begin_frame() else {
                        summary.frames_dropped += 1;
                        log::debug!("Previous frame still in flight, dropping tick");
                        continue;
                    };

                    summary.frames_submitted += 1;
                    let request = FrameRequest::new(image_data, self.exercise_type.clone());
                    let submitter = Arc::clone(&submitter);
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let result = submitter.submit(request).await;
                        // The receiver only goes away once the recording is over
                        let _ = tx.send(result);
                        drop(guard);
                    });
                }
                Some(result) = rx.recv() => self.handle_result(result, &mut summary),
            }
        }

        // Let outstanding frames land before stopping
        drop(tx);
        while let Some(result) = rx.recv().await {
            self.handle_result(result, &mut summary);
        }

        summary.session = self.stop(Utc::now());
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration as ChronoDuration;
    use std::sync::atomic::AtomicU32;

    /// Counts calls and reports the running total as the rep count
    struct CountingSubmitter {
        calls: AtomicU32,
        delay: Duration,
    }

    impl CountingSubmitter {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                delay,
            })
        }
    }

    #[async_trait]
    impl FrameSubmitter for CountingSubmitter {
        async fn submit(&self, request: FrameRequest) -> Result<FrameReading> {
            tokio::time::sleep(self.delay).await;
            let count = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            assert_eq!(request.exercise_type.as_deref(), Some("Push-ups"));
            Ok(FrameReading {
                count,
                form_score: 90,
                state: "up".to_string(),
                timestamp: 0,
            })
        }
    }

    struct FailingSubmitter;

    #[async_trait]
    impl FrameSubmitter for FailingSubmitter {
        async fn submit(&self, _request: FrameRequest) -> Result<FrameReading> {
            anyhow::bail!("connection refused")
        }
    }

    fn reading(count: u32, form_score: u32) -> FrameReading {
        FrameReading {
            count,
            form_score,
            state: "down".to_string(),
            timestamp: 1,
        }
    }

    #[test]
    fn test_stop_without_reps_saves_nothing() {
        let mut recorder = Recorder::new("Squats");
        let start = Utc::now();
        recorder.start(start);
        recorder.apply(reading(0, 70));

        assert!(recorder.stop(start + ChronoDuration::seconds(30)).is_none());
        assert!(!recorder.is_recording());
    }

    #[test]
    fn test_stop_derives_duration_and_calories() {
        let mut recorder = Recorder::new("Push-ups");
        let start = Utc::now();
        recorder.start(start);
        recorder.apply(reading(10, 92));

        let session = recorder.stop(start + ChronoDuration::seconds(60)).unwrap();
        assert_eq!(session.count, 10);
        assert_eq!(session.duration, 60_000);
        assert_eq!(session.form_score, 92);
        assert_eq!(session.calories, 7);
        assert_eq!(recorder.reading().count, 0);
    }

    #[test]
    fn test_stop_when_idle_is_none() {
        let mut recorder = Recorder::new("Punches");
        assert!(recorder.stop(Utc::now()).is_none());
    }

    #[test]
    fn test_apply_ignored_when_not_recording() {
        let mut recorder = Recorder::new("Punches");
        recorder.apply(reading(5, 50));
        assert_eq!(recorder.reading().count, 0);
        assert_eq!(recorder.reading().state, "ready");
    }

    #[test]
    fn test_only_one_frame_in_flight() {
        let recorder = Recorder::new("Squats");
        let guard = recorder.try_begin_frame().unwrap();
        assert!(recorder.try_begin_frame().is_none());

        drop(guard);
        assert!(recorder.try_begin_frame().is_some());
    }

    #[tokio::test]
    async fn test_run_records_last_reading() {
        let mut recorder = Recorder::new("Push-ups");
        let submitter = CountingSubmitter::new(Duration::ZERO);
        let frames = vec!["aGVsbG8=".to_string(); 3];

        let summary = recorder
            .run(frames, submitter.clone(), Duration::from_millis(20))
            .await;

        assert_eq!(summary.frames_submitted + summary.frames_dropped, 3);
        assert_eq!(summary.frames_failed, 0);
        let session = summary.session.unwrap();
        assert_eq!(session.count, submitter.calls.load(Ordering::SeqCst));
        assert_eq!(session.form_score, 90);
        assert!(!recorder.is_recording());
    }

    #[tokio::test]
    async fn test_run_drops_ticks_while_frame_in_flight() {
        let mut recorder = Recorder::new("Push-ups");
        let submitter = CountingSubmitter::new(Duration::from_millis(60));
        let frames = vec!["aGVsbG8=".to_string(); 6];

        let summary = recorder
            .run(frames, submitter.clone(), Duration::from_millis(10))
            .await;

        assert_eq!(summary.frames_submitted + summary.frames_dropped, 6);
        assert!(summary.frames_dropped > 0);
        assert_eq!(
            summary.frames_submitted,
            submitter.calls.load(Ordering::SeqCst)
        );
    }

    #[tokio::test]
    async fn test_run_with_failing_submitter_saves_nothing() {
        let mut recorder = Recorder::new("Push-ups");
        let summary = recorder
            .run(
                vec!["aGVsbG8=".to_string(); 2],
                Arc::new(FailingSubmitter),
                Duration::from_millis(5),
            )
            .await;

        assert_eq!(summary.frames_failed, summary.frames_submitted);
        assert!(summary.session.is_none());
    }
}
