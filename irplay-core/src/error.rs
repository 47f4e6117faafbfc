//! Error types for encoding and playback

use thiserror::Error;

use crate::io::IoError;

/// Errors that can occur while preparing or playing back a recording
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayError {
    /// Recording file content is not a valid pulse recording
    #[error("Invalid recording: {0}")]
    InvalidRecording(String),

    /// Carrier frequency or duty cycle out of range
    #[error("Invalid carrier: {0}")]
    InvalidCarrier(String),

    /// GPIO line cannot be used in a waveform mask
    #[error("Invalid GPIO line {0}: must be between 0 and 31")]
    InvalidLine(u32),

    /// Repeat count of zero
    #[error("Repeat count must be at least 1")]
    InvalidRepeat,

    /// Output line setup or waveform clear was refused
    #[error("Hardware operation failed: {0}")]
    Hardware(IoError),

    /// Hardware subsystem rejected the transition sequence
    #[error("Failed to create wave: {code}")]
    WaveformCreation { code: i32 },

    /// Transmission or busy polling failed
    #[error("Transmission failed: {0}")]
    Transmission(IoError),
}

impl From<serde_json::Error> for PlayError {
    fn from(e: serde_json::Error) -> Self {
        PlayError::InvalidRecording(e.to_string())
    }
}
