//! Reading and writing recording files.

use std::fs;
use std::path::Path;

use irplay_core::Recording;
use log::debug;

use crate::error::AppError;

/// Load a recording from `path`.
pub fn load_recording(path: &Path) -> Result<Recording, AppError> {
    let text = fs::read_to_string(path).map_err(|source| AppError::ReadRecording {
        path: path.to_owned(),
        source,
    })?;

    let recording = Recording::from_json(&text).map_err(|source| AppError::InvalidRecording {
        path: path.to_owned(),
        source,
    })?;

    debug!(
        "Parsed {} durations ({} marks, {} µs) from {}",
        recording.pulse_us.len(),
        recording.mark_count(),
        recording.duration_us(),
        path.display()
    );
    Ok(recording)
}

/// Write a recording to `path` as pretty-printed JSON.
pub fn save_recording(path: &Path, recording: &Recording) -> Result<(), AppError> {
    let text = recording
        .to_json()
        .map_err(|source| AppError::InvalidRecording {
            path: path.to_owned(),
            source,
        })?;
    fs::write(path, text).map_err(|source| AppError::WriteRecording {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use irplay_core::PlayError;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("power.json");
        let recording = Recording::new(Some(4), vec![1000, 500, 1000]);

        save_recording(&path, &recording).unwrap();
        let loaded = load_recording(&path).unwrap();

        assert_eq!(loaded.gpio_in, Some(4));
        assert_eq!(loaded.pulse_us, vec![1000, 500, 1000]);
    }

    #[test]
    fn test_load_recorder_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tv.json");
        fs::write(&path, r#"{"gpio_in": 18, "pulse_us": [9000, 4500, 560, 1690, 560]}"#).unwrap();

        let loaded = load_recording(&path).unwrap();
        assert_eq!(loaded.gpio_in, Some(18));
        assert_eq!(loaded.pulse_us.len(), 5);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = load_recording(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, AppError::ReadRecording { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"gpio_in": 4, "pulse_us": [1000, 1.5]}"#).unwrap();

        match load_recording(&path).unwrap_err() {
            AppError::InvalidRecording { source, .. } => {
                assert!(matches!(source, PlayError::InvalidRecording(_)))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_save_failure_names_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("power.json");

        let err = save_recording(&path, &Recording::new(None, vec![560])).unwrap_err();
        match &err {
            AppError::WriteRecording { path: failed, .. } => assert_eq!(failed, &path),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("power.json"));
        assert_eq!(err.exit_code(), 1);
    }
}
