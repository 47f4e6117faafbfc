//! Top-level errors reported by the `irplay` binary.

use std::path::PathBuf;

use irplay_core::{IoError, PlayError};
use miette::Diagnostic;
use thiserror::Error;

/// Process exit code when the daemon cannot be reached
pub const EXIT_CONNECTION: u8 = 2;

/// Process exit code for every other failure
pub const EXIT_FAILURE: u8 = 1;

#[derive(Error, Diagnostic, Debug)]
pub enum AppError {
    #[error("Could not connect to pigpio daemon at {address}")]
    #[diagnostic(
        code(irplay::connection),
        help("Start the daemon with: sudo pigpiod")
    )]
    Connection {
        address: String,
        #[source]
        source: IoError,
    },

    #[error("Cannot read recording '{}'", .path.display())]
    #[diagnostic(code(irplay::read_recording))]
    ReadRecording {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write recording '{}'", .path.display())]
    #[diagnostic(code(irplay::write_recording))]
    WriteRecording {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Recording '{}' is malformed", .path.display())]
    #[diagnostic(
        code(irplay::invalid_recording),
        help("Expected a JSON object with a \"pulse_us\" array of non-negative integers")
    )]
    InvalidRecording {
        path: PathBuf,
        #[source]
        source: PlayError,
    },

    #[error(transparent)]
    #[diagnostic(code(irplay::playback))]
    Playback(#[from] PlayError),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Connection { .. } => EXIT_CONNECTION,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let conn = AppError::Connection {
            address: "localhost:8888".to_string(),
            source: IoError::new(-1, "refused"),
        };
        assert_eq!(conn.exit_code(), 2);
        assert_eq!(
            conn.to_string(),
            "Could not connect to pigpio daemon at localhost:8888"
        );

        let rejected = AppError::Playback(PlayError::WaveformCreation { code: -36 });
        assert_eq!(rejected.exit_code(), 1);
        assert_eq!(rejected.to_string(), "Failed to create wave: -36");
    }
}
