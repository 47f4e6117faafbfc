//! Hardware abstraction for waveform playback.
//!
//! This module defines the boundary between the platform-independent playback
//! logic and whatever actually drives the GPIO pins. The native binary talks to
//! the pigpio daemon over its socket protocol; tests use an in-memory recorder.
//!
//! # Design
//!
//! The trait is **blocking** and synchronous because the daemon serialises
//! waveform state per connection and every status query is a cheap round trip.
//! A single owner holds the provider for the whole session and lends it to the
//! [`Transmitter`](crate::transmitter::Transmitter) by `&mut` reference.
//!
//! # Example
//!
//! ```rust,ignore
//! use irplay_core::io::{GpioLine, Level, PinMode, WaveIo};
//!
//! fn idle_low<I: WaveIo>(io: &mut I, line: GpioLine) -> Result<(), IoError> {
//!     io.set_mode(line, PinMode::Output)?;
//!     io.write(line, Level::Low)
//! }
//! ```

use core::fmt;
use std::time::Duration;

use crate::error::PlayError;

/// Highest GPIO number addressable by a 32-bit waveform mask.
pub const MAX_GPIO_LINE: u32 = 31;

// =============================================================================
// Error Types
// =============================================================================

/// I/O error type for hardware boundary operations.
///
/// The code follows the pigpio convention: negative values are daemon error
/// codes, `-1` doubles as a generic transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoError {
    /// Error code (negative values indicate errors)
    pub code: i32,
    /// Human-readable error message
    pub message: String,
}

impl IoError {
    /// Create a new I/O error with a code and message.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a "not connected" error.
    pub fn not_connected() -> Self {
        Self::new(-1, "Not connected")
    }

    /// Create a "timed out" error.
    pub fn timed_out() -> Self {
        Self::new(-110, "Operation timed out")
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for IoError {}

// =============================================================================
// Pin and Pulse Types
// =============================================================================

/// A validated BCM GPIO line number usable in a waveform mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpioLine(u32);

impl GpioLine {
    /// Validate a line number. Only 0..=31 fit in a pulse mask.
    pub fn new(line: u32) -> Result<Self, PlayError> {
        if line > MAX_GPIO_LINE {
            return Err(PlayError::InvalidLine(line));
        }
        Ok(Self(line))
    }

    pub fn number(&self) -> u32 {
        self.0
    }

    /// Bit mask selecting this line in a [`Pulse`].
    pub fn mask(&self) -> u32 {
        1 << self.0
    }
}

impl TryFrom<u32> for GpioLine {
    type Error = PlayError;

    fn try_from(line: u32) -> Result<Self, Self::Error> {
        GpioLine::new(line)
    }
}

impl fmt::Display for GpioLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Pin function as understood by the daemon's mode command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum PinMode {
    Input = 0,
    Output = 1,
}

/// Electrical level of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Level {
    Low = 0,
    High = 1,
}

/// One entry of a transition sequence.
///
/// At the start of the entry every line in `gpio_on` is driven high and every
/// line in `gpio_off` is driven low; the levels are then held for `delay_us`.
/// Layout matches the daemon's `gpioPulse_t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub gpio_on: u32,
    pub gpio_off: u32,
    pub delay_us: u32,
}

impl Pulse {
    /// Drive `line` high for `delay_us`.
    pub fn high(line: GpioLine, delay_us: u32) -> Self {
        Self {
            gpio_on: line.mask(),
            gpio_off: 0,
            delay_us,
        }
    }

    /// Drive `line` low for `delay_us`.
    pub fn low(line: GpioLine, delay_us: u32) -> Self {
        Self {
            gpio_on: 0,
            gpio_off: line.mask(),
            delay_us,
        }
    }

    /// Level this pulse asserts on `line`, if it touches it at all.
    pub fn level_of(&self, line: GpioLine) -> Option<Level> {
        if self.gpio_on & line.mask() != 0 {
            Some(Level::High)
        } else if self.gpio_off & line.mask() != 0 {
            Some(Level::Low)
        } else {
            None
        }
    }
}

/// Opaque handle to a waveform registered with the hardware subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaveId(pub u32);

impl fmt::Display for WaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wave #{}", self.0)
    }
}

// =============================================================================
// WaveIo Trait
// =============================================================================

/// Blocking hardware provider for GPIO waveform output.
///
/// Implementations exist for:
/// - **Native**: the pigpio daemon socket client in the `irplay` crate
/// - **Tests**: call-recording mocks
pub trait WaveIo {
    /// Set the function of a GPIO line.
    fn set_mode(&mut self, line: GpioLine, mode: PinMode) -> Result<(), IoError>;

    /// Drive a line to a level immediately.
    fn write(&mut self, line: GpioLine, level: Level) -> Result<(), IoError>;

    /// Forget every waveform registered on this connection.
    fn wave_clear(&mut self) -> Result<(), IoError>;

    /// Register a transition sequence as a new waveform.
    ///
    /// Returns `Ok(id)` with a non-negative waveform id on success. A daemon
    /// rejection is reported as `Ok(code)` with the negative error code, so the
    /// caller can tell it apart from a transport failure (`Err`).
    fn wave_register(&mut self, pulses: &[Pulse]) -> Result<i32, IoError>;

    /// Start a single transmission of a registered waveform.
    fn wave_send_once(&mut self, wave: WaveId) -> Result<(), IoError>;

    /// Whether a waveform is still being transmitted.
    fn wave_tx_busy(&mut self) -> Result<bool, IoError>;

    /// Release a registered waveform.
    fn wave_delete(&mut self, wave: WaveId) -> Result<(), IoError>;

    /// Block between two busy polls.
    ///
    /// Default implementation sleeps the calling thread.
    fn pause(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = IoError::new(-66, "bad wave id");
        assert_eq!(format!("{}", err), "bad wave id (code -66)");
    }

    #[test]
    fn test_gpio_line_bounds() {
        assert_eq!(GpioLine::new(0).unwrap().mask(), 1);
        assert_eq!(GpioLine::new(12).unwrap().mask(), 0x1000);
        assert_eq!(GpioLine::new(31).unwrap().mask(), 0x8000_0000);
        assert!(matches!(GpioLine::new(32), Err(PlayError::InvalidLine(32))));
    }

    #[test]
    fn test_pulse_levels() {
        let line = GpioLine::new(12).unwrap();
        let other = GpioLine::new(4).unwrap();

        let high = Pulse::high(line, 10);
        assert_eq!(high.gpio_on, 1 << 12);
        assert_eq!(high.gpio_off, 0);
        assert_eq!(high.level_of(line), Some(Level::High));
        assert_eq!(high.level_of(other), None);

        let low = Pulse::low(line, 10);
        assert_eq!(low.level_of(line), Some(Level::Low));
    }
}
