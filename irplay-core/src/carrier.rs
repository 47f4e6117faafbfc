//! Carrier wave parameters.

use crate::error::PlayError;

/// Default IR carrier frequency in Hz
pub const DEFAULT_CARRIER_HZ: u32 = 38_000;

/// Default fraction of each carrier period spent high
pub const DEFAULT_DUTY_CYCLE: f64 = 0.33;

/// Highest frequency that still yields a carrier period of at least 1 µs
pub const MAX_CARRIER_HZ: u32 = 1_000_000;

/// Validated carrier frequency and duty cycle, fixed for one playback session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Carrier {
    frequency_hz: u32,
    duty_cycle: f64,
}

impl Default for Carrier {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_CARRIER_HZ,
            duty_cycle: DEFAULT_DUTY_CYCLE,
        }
    }
}

impl Carrier {
    pub fn new(frequency_hz: u32, duty_cycle: f64) -> Result<Self, PlayError> {
        if frequency_hz == 0 || frequency_hz > MAX_CARRIER_HZ {
            return Err(PlayError::InvalidCarrier(format!(
                "frequency {} Hz outside 1..={} Hz",
                frequency_hz, MAX_CARRIER_HZ
            )));
        }
        // NaN fails both comparisons
        if !(duty_cycle > 0.0 && duty_cycle <= 1.0) {
            return Err(PlayError::InvalidCarrier(format!(
                "duty cycle {} outside (0, 1]",
                duty_cycle
            )));
        }
        Ok(Self {
            frequency_hz,
            duty_cycle,
        })
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub fn duty_cycle(&self) -> f64 {
        self.duty_cycle
    }

    /// Whole microseconds per carrier cycle (truncated).
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.frequency_hz
    }

    /// High and low widths of one cycle in microseconds.
    ///
    /// The high part is truncated, the low part takes the rest of the period.
    pub fn on_off_us(&self) -> (u32, u32) {
        let period_us = self.period_us();
        let on_us = (period_us as f64 * self.duty_cycle) as u32;
        (on_us, period_us - on_us)
    }
}
