//! Waveform transmission controller.
//!
//! Drives one output line through a [`WaveIo`] provider:
//!
//! ```text
//! Idle ─► LineConfigured ─► WaveformRegistered ─┬─► Transmitting ─┐
//!  ▲                             ▲              │                 │
//!  │                             └──────────────┼─────────────────┘
//!  │                                            ▼
//!  └─────────────────────────────────── WaveformReleased
//! ```
//!
//! Every call to [`Transmitter::play`] ends back in `Idle`, whether it
//! succeeds or fails part way.
//!
//! The registered waveform is owned by a [`WaveGuard`] so it is deleted on
//! every exit path, including a failed repeat.

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};

use crate::carrier::Carrier;
use crate::encoder::{
    encode_sequence, total_duration_us, transition_count, MAX_WAVE_PULSES, TOO_MANY_PULSES,
};
use crate::error::PlayError;
use crate::io::{GpioLine, IoError, Level, PinMode, WaveId, WaveIo};

/// Interval between two "transmission busy" queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Playback state of a [`Transmitter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    LineConfigured,
    WaveformRegistered,
    Transmitting,
    WaveformReleased,
}

impl PlaybackState {
    /// No waveform is held; a new `play` may start.
    pub fn is_idle(&self) -> bool {
        matches!(self, PlaybackState::Idle)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "idle"),
            PlaybackState::LineConfigured => write!(f, "line configured"),
            PlaybackState::WaveformRegistered => write!(f, "waveform registered"),
            PlaybackState::Transmitting => write!(f, "transmitting"),
            PlaybackState::WaveformReleased => write!(f, "waveform released"),
        }
    }
}

/// Summary of a finished playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackReport {
    /// Number of mark/space durations played
    pub durations: usize,
    /// Number of entries in the registered waveform
    pub transitions: usize,
    /// Length of one transmission in microseconds
    pub frame_us: u64,
    /// Number of transmissions completed
    pub repeats: u32,
    /// Busy queries that reported "still transmitting"
    pub busy_polls: u32,
}

/// Scoped ownership of a registered waveform.
///
/// Call [`WaveGuard::release`] to delete the waveform and observe the result.
/// If the guard is dropped without it (unwinding), the waveform is still
/// deleted and a failure is only logged.
pub struct WaveGuard<'a, I: WaveIo> {
    io: &'a mut I,
    wave: WaveId,
    released: bool,
}

impl<'a, I: WaveIo> WaveGuard<'a, I> {
    pub fn new(io: &'a mut I, wave: WaveId) -> Self {
        Self {
            io,
            wave,
            released: false,
        }
    }

    pub fn wave(&self) -> WaveId {
        self.wave
    }

    pub fn io(&mut self) -> &mut I {
        self.io
    }

    pub fn release(mut self) -> Result<(), IoError> {
        self.released = true;
        debug!("Deleting {}", self.wave);
        self.io.wave_delete(self.wave)
    }
}

impl<I: WaveIo> Drop for WaveGuard<'_, I> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.io.wave_delete(self.wave) {
                warn!("Failed to delete {}: {}", self.wave, e);
            }
        }
    }
}

/// Plays pulse recordings on a single output line.
pub struct Transmitter<'a, I: WaveIo> {
    io: &'a mut I,
    line: GpioLine,
    carrier: Carrier,
    poll_interval: Duration,
    state: PlaybackState,
}

impl<'a, I: WaveIo> Transmitter<'a, I> {
    pub fn new(io: &'a mut I, line: GpioLine, carrier: Carrier) -> Self {
        Self {
            io,
            line,
            carrier,
            poll_interval: DEFAULT_POLL_INTERVAL,
            state: PlaybackState::Idle,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn line(&self) -> GpioLine {
        self.line
    }

    pub fn carrier(&self) -> &Carrier {
        &self.carrier
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Encode `pulses` and transmit them `repeat` times, blocking until done.
    ///
    /// The line is left at whatever level the waveform ends on; a recording
    /// ending on a mark can leave it high until [`Transmitter::cleanup`].
    pub fn play(&mut self, pulses: &[u32], repeat: u32) -> Result<PlaybackReport, PlayError> {
        if repeat == 0 {
            return Err(PlayError::InvalidRepeat);
        }

        let result = self.run(pulses, repeat);
        if self.state != PlaybackState::Idle {
            set_state(&mut self.state, PlaybackState::Idle);
        }
        result
    }

    fn run(&mut self, pulses: &[u32], repeat: u32) -> Result<PlaybackReport, PlayError> {
        self.io
            .set_mode(self.line, PinMode::Output)
            .map_err(PlayError::Hardware)?;
        self.io
            .write(self.line, Level::Low)
            .map_err(PlayError::Hardware)?;
        set_state(&mut self.state, PlaybackState::LineConfigured);

        let transitions = transition_count(pulses, &self.carrier);
        if transitions > MAX_WAVE_PULSES {
            warn!(
                "Recording needs {} transitions, more than the {} a waveform can hold",
                transitions, MAX_WAVE_PULSES
            );
            return Err(PlayError::WaveformCreation {
                code: TOO_MANY_PULSES,
            });
        }

        let wave = encode_sequence(pulses, self.line, &self.carrier);
        let frame_us = total_duration_us(&wave);
        debug!(
            "Encoded {} durations into {} transitions ({} µs) on {}",
            pulses.len(),
            wave.len(),
            frame_us,
            self.line
        );

        self.io.wave_clear().map_err(PlayError::Hardware)?;
        let code = self.io.wave_register(&wave).map_err(PlayError::Hardware)?;
        if code < 0 {
            return Err(PlayError::WaveformCreation { code });
        }

        let mut guard = WaveGuard::new(&mut *self.io, WaveId(code as u32));
        set_state(&mut self.state, PlaybackState::WaveformRegistered);

        let outcome = transmit_repeated(&mut guard, &mut self.state, repeat, self.poll_interval);
        let released = guard.release();
        set_state(&mut self.state, PlaybackState::WaveformReleased);

        let busy_polls = match (outcome, released) {
            (Ok(polls), Ok(())) => polls,
            (Ok(_), Err(e)) => return Err(PlayError::Transmission(e)),
            (Err(e), Ok(())) => return Err(e),
            (Err(e), Err(release_err)) => {
                warn!("Failed to delete waveform after error: {}", release_err);
                return Err(e);
            }
        };

        Ok(PlaybackReport {
            durations: pulses.len(),
            transitions: wave.len(),
            frame_us,
            repeats: repeat,
            busy_polls,
        })
    }

    /// Force the output line low. Failures are logged and swallowed.
    ///
    /// Consumes the transmitter, so it runs at most once per session.
    pub fn cleanup(self) {
        match self.io.write(self.line, Level::Low) {
            Ok(()) => debug!("{} forced low", self.line),
            Err(e) => debug!("Ignoring cleanup failure on {}: {}", self.line, e),
        }
    }
}

fn set_state(state: &mut PlaybackState, next: PlaybackState) {
    debug!("Playback {} -> {}", state, next);
    *state = next;
}

/// Send the guarded waveform `repeat` times, returning the number of busy polls.
fn transmit_repeated<I: WaveIo>(
    guard: &mut WaveGuard<'_, I>,
    state: &mut PlaybackState,
    repeat: u32,
    poll_interval: Duration,
) -> Result<u32, PlayError> {
    let wave = guard.wave();
    let mut busy_polls = 0;

    for n in 0..repeat {
        set_state(state, PlaybackState::Transmitting);
        guard
            .io()
            .wave_send_once(wave)
            .map_err(PlayError::Transmission)?;

        while guard.io().wave_tx_busy().map_err(PlayError::Transmission)? {
            busy_polls += 1;
            guard.io().pause(poll_interval);
        }
        set_state(state, PlaybackState::WaveformRegistered);

        if repeat > 1 {
            info!("Sent {} ({}/{})", wave, n + 1, repeat);
        }
    }
    Ok(busy_polls)
}
