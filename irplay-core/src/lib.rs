//! # irplay Core
//!
//! Platform-independent infrared replay library.
//!
//! This crate turns recorded mark/space timings into carrier-modulated GPIO
//! waveforms and drives their transmission. It has **no socket or daemon
//! dependencies**; all hardware access goes through the [`WaveIo`] trait.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  irplay-core (platform-independent, no sockets)            │
//! │  ├── recording/   (JSON pulse recordings)                  │
//! │  ├── carrier/     (frequency + duty cycle)                 │
//! │  ├── encoder/     (mark/space -> transition sequence)      │
//! │  ├── transmitter/ (register, send, poll, release)          │
//! │  └── WaveIo       (abstracts the GPIO waveform hardware)   │
//! └─────────────────────────────────────────────────────────────┘
//!                              ▲
//!                 ┌────────────┴────────────┐
//!                 │  irplay                 │
//!                 │  (PigpiodIo, CLI)       │
//!                 └─────────────────────────┘
//! ```
//!
//! ## Key Modules
//!
//! - [`encoder`] - Carrier synthesis for marks, held-low spaces
//! - [`transmitter`] - Playback state machine with scoped waveform release
//! - [`recording`] - Recording file model
//! - [`io`] - Hardware boundary trait ([`WaveIo`])
//!
//! ## Example: Encoding a Frame
//!
//! ```rust
//! use irplay_core::{encode_sequence, Carrier, GpioLine};
//!
//! let line = GpioLine::new(12).unwrap();
//! let carrier = Carrier::new(38_000, 0.33).unwrap();
//! let wave = encode_sequence(&[9000, 4500, 560, 560], line, &carrier);
//! assert!(!wave.is_empty());
//! ```

pub mod carrier;
pub mod encoder;
pub mod error;
pub mod io;
pub mod recording;
pub mod transmitter;

// Re-export commonly used types
pub use carrier::{Carrier, DEFAULT_CARRIER_HZ, DEFAULT_DUTY_CYCLE};
pub use encoder::{
    encode_mark, encode_sequence, encode_space, transition_count, TransitionSequence,
    MAX_WAVE_PULSES,
};
pub use error::PlayError;
pub use io::{GpioLine, IoError, Level, PinMode, Pulse, WaveId, WaveIo};
pub use recording::Recording;
pub use transmitter::{PlaybackReport, PlaybackState, Transmitter, WaveGuard};
