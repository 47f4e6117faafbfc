//! Mark/space to transition sequence encoding.
//!
//! A recording is a list of alternating durations in microseconds: even
//! positions are marks (carrier on), odd positions are spaces (line low).
//! Marks are synthesised as a train of carrier cycles, spaces as a single
//! held-low entry.
//!
//! ```text
//!  mark 60µs @ 38kHz, duty 0.33          space 100µs
//!  ┌──┐      ┌──┐          ┌───────┐
//!  │8 │  18  │8 │    18    │  rem  │
//! ─┘  └──────┘  └──────────┘   8   └────────────────────────
//! ```
//!
//! The trailing remainder of a mark is emitted high, so a mark can end with
//! the line asserted; the following space brings it back low.

use crate::carrier::Carrier;
use crate::io::{GpioLine, Pulse};

/// Ordered level transitions ready to be registered as a waveform.
pub type TransitionSequence = Vec<Pulse>;

/// Largest waveform the daemon accepts (`PI_WAVE_MAX_PULSES`)
pub const MAX_WAVE_PULSES: u64 = 12_000;

/// Daemon code for a waveform over [`MAX_WAVE_PULSES`] (`PI_TOO_MANY_PULSES`)
pub const TOO_MANY_PULSES: i32 = -36;

/// Encode one mark as carrier cycles.
///
/// At least one full cycle is always emitted, so marks shorter than one
/// carrier period are rounded up to a period.
pub fn encode_mark(duration_us: u32, line: GpioLine, carrier: &Carrier) -> TransitionSequence {
    let period_us = carrier.period_us();
    let (on_us, off_us) = carrier.on_off_us();
    let cycles = (duration_us / period_us).max(1);

    let per_cycle = (on_us > 0) as usize + (off_us > 0) as usize;
    let mut pulses = Vec::with_capacity(cycles as usize * per_cycle + 1);
    for _ in 0..cycles {
        if on_us > 0 {
            pulses.push(Pulse::high(line, on_us));
        }
        if off_us > 0 {
            pulses.push(Pulse::low(line, off_us));
        }
    }

    let emitted_us = u64::from(cycles) * u64::from(period_us);
    if u64::from(duration_us) > emitted_us {
        let rem_us = (u64::from(duration_us) - emitted_us) as u32;
        pulses.push(Pulse::high(line, rem_us));
    }
    pulses
}

/// Encode one space as a held-low entry. Zero-length spaces encode to nothing.
pub fn encode_space(duration_us: u32, line: GpioLine) -> TransitionSequence {
    if duration_us == 0 {
        return Vec::new();
    }
    vec![Pulse::low(line, duration_us)]
}

/// Encode a whole mark/space recording.
pub fn encode_sequence(pulses: &[u32], line: GpioLine, carrier: &Carrier) -> TransitionSequence {
    let mut wave = TransitionSequence::new();
    for (i, &duration_us) in pulses.iter().enumerate() {
        if i % 2 == 0 {
            wave.extend(encode_mark(duration_us, line, carrier));
        } else {
            wave.extend(encode_space(duration_us, line));
        }
    }
    wave
}

/// Number of entries [`encode_sequence`] would produce, without allocating them.
pub fn transition_count(pulses: &[u32], carrier: &Carrier) -> u64 {
    let period_us = carrier.period_us();
    let (on_us, off_us) = carrier.on_off_us();
    let per_cycle = u64::from(on_us > 0) + u64::from(off_us > 0);

    pulses
        .iter()
        .enumerate()
        .map(|(i, &duration_us)| {
            if i % 2 == 1 {
                return u64::from(duration_us > 0);
            }
            let cycles = (duration_us / period_us).max(1);
            let remainder = u64::from(duration_us) > u64::from(cycles) * u64::from(period_us);
            u64::from(cycles) * per_cycle + u64::from(remainder)
        })
        .fold(0u64, u64::saturating_add)
}

/// Total time covered by a transition sequence.
pub fn total_duration_us(wave: &[Pulse]) -> u64 {
    wave.iter().map(|p| u64::from(p.delay_us)).sum()
}
