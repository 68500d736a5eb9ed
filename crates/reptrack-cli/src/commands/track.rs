//! Record a workout from a directory of captured frames

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reptrack_core::{Config, Recorder};
use reptrack_detector::{encode_jpeg, FrameSubmitter, HttpSubmitter, LocalSubmitter};

use super::helpers::{format_duration, open_store};
use super::workout::print_goal_line;

/// JPEG files in `dir`, sorted by file name
pub fn frame_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"))
        })
        .collect();
    files.sort();
    Ok(files)
}

fn load_frames(dir: &Path) -> Result<Vec<String>> {
    let files = frame_files(dir)?;
    if files.is_empty() {
        bail!("No .jpg frames found in {}", dir.display());
    }

    files
        .iter()
        .map(|path| {
            std::fs::read(path)
                .map(|bytes| encode_jpeg(&bytes))
                .with_context(|| format!("Failed to read frame {}", path.display()))
        })
        .collect()
}

pub async fn handle_track(
    config: &Config,
    exercise: &str,
    frames_dir: &Path,
    server: Option<&str>,
    interval_ms: Option<u64>,
) -> Result<()> {
    let frames = load_frames(frames_dir)?;
    let interval = interval_ms.map_or_else(|| config.frame_interval(), |ms| Duration::from_millis(ms.max(1)));

    let submitter: Arc<dyn FrameSubmitter> = match server {
        Some(url) => {
            let submitter = HttpSubmitter::new(url)?;
            log::info!("Submitting frames to {}", submitter.endpoint());
            Arc::new(submitter)
        }
        None => Arc::new(LocalSubmitter::new(reptrack_server::build_relay(config))),
    };

    println!(
        "Tracking {exercise}: {} frames every {}ms",
        frames.len(),
        interval.as_millis()
    );

    let mut recorder = Recorder::new(exercise);
    let summary = recorder.run(frames, submitter, interval).await;

    println!(
        "Frames: {} submitted, {} dropped, {} failed",
        summary.frames_submitted, summary.frames_dropped, summary.frames_failed
    );

    let Some(session) = summary.session else {
        println!("No reps counted, nothing saved");
        return Ok(());
    };

    let mut store = open_store(config)?;
    let saved = store.save(session);
    println!(
        "Saved {} x{} in {} (form {}%, {} kcal)",
        saved.exercise_type,
        saved.count,
        format_duration(saved.duration),
        saved.form_score,
        saved.calories
    );
    print_goal_line(&store, exercise);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_frame_files_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["002.jpg", "001.JPG", "003.jpeg", "notes.txt", "004.png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let names: Vec<String> = frame_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["001.JPG", "002.jpg", "003.jpeg"]);
    }

    #[test]
    fn test_load_frames_empty_dir_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_frames(dir.path()).is_err());
    }

    #[test]
    fn test_load_frames_encodes_data_urls() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();

        let frames = load_frames(dir.path()).unwrap();
        assert_eq!(frames, vec![encode_jpeg(b"jpeg")]);
    }
}
