//! # irplay
//!
//! Replays recorded infrared remote-control frames on a Raspberry Pi GPIO.
//!
//! A recording is a list of mark/space durations. Each mark is turned into a
//! carrier burst, the whole frame is uploaded to the pigpio daemon as a
//! waveform and transmitted with DMA-accurate timing.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        irplay                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌──────────────────┐ │
//! │  │ Cli         │  │ recording   │  │ config           │ │
//! │  │ (clap)      │  │ (JSON file) │  │ (daemon, dirs)   │ │
//! │  └──────┬──────┘  └──────┬──────┘  └──────────────────┘ │
//! │         ▼                ▼                              │
//! │  ┌─────────────────────────────────────────────────────┐│
//! │  │  Session                                            ││
//! │  │  - owns the daemon connection                       ││
//! │  │  - runs irplay_core::Transmitter, then cleanup      ││
//! │  └─────────────────────────────────────────────────────┘│
//! │         │                                               │
//! │         ▼                                               │
//! │  ┌─────────────────────────────────────────────────────┐│
//! │  │  PigpiodIo                                          ││
//! │  │  - pigpiod socket protocol                          ││
//! │  │  - Implements irplay_core::WaveIo                   ││
//! │  └─────────────────────────────────────────────────────┘│
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Command-Line Interface
//!
//! See [`Cli`] for all available options. Key options:
//!
//! - `FILE` - Recording to play (path, or name in the recordings directory)
//! - `--out-gpio` - Output pin driving the IR LED (default: 12)
//! - `--carrier` - Carrier frequency in Hz (default: 38000)
//! - `--repeat` - Number of transmissions (default: 1)
//! - `--host`, `--port` - pigpio daemon (default: `PIGPIO_ADDR`/`PIGPIO_PORT` or localhost:8888)
//!
//! ## Exit Codes
//!
//! | Code | Meaning                          |
//! |------|----------------------------------|
//! | 0    | Playback finished                |
//! | 1    | Any other failure                |
//! | 2    | pigpio daemon not reachable      |

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;

use clap::Parser;
use irplay_core::{Carrier, GpioLine, PlayError, PlaybackReport, Transmitter};
use irplay_core::{DEFAULT_CARRIER_HZ, DEFAULT_DUTY_CYCLE};
use log::{debug, info, warn};

pub mod config;
pub mod error;
pub mod pigpiod_io;
pub mod recording;

use config::{DaemonAddress, DEFAULT_DAEMON_HOST, DEFAULT_DAEMON_PORT};
use error::AppError;
use pigpiod_io::PigpiodIo;
use recording::{load_recording, resolve_recording_path};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default output pin (BCM numbering)
pub const DEFAULT_OUT_GPIO: u32 = 12;

#[derive(Parser, Clone, Debug)]
#[command(name = "irplay", version, about = "Replay recorded IR signals (raw pulses).")]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// JSON file with recorded pulses
    pub file: PathBuf,

    /// GPIO pin number for IR transmitter (BCM)
    #[arg(long, default_value_t = DEFAULT_OUT_GPIO)]
    pub out_gpio: u32,

    /// Carrier frequency in Hz (e.g. 38000)
    #[arg(long, default_value_t = DEFAULT_CARRIER_HZ)]
    pub carrier: u32,

    /// Fraction of each carrier period the LED is lit
    #[arg(long, default_value_t = DEFAULT_DUTY_CYCLE)]
    pub duty_cycle: f64,

    /// How many times to repeat the frame
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Host running the pigpio daemon
    #[arg(long, env = "PIGPIO_ADDR", default_value = DEFAULT_DAEMON_HOST)]
    pub host: String,

    /// Port of the pigpio daemon
    #[arg(long, env = "PIGPIO_PORT", default_value_t = DEFAULT_DAEMON_PORT)]
    pub port: u16,
}

impl Cli {
    pub fn line(&self) -> Result<GpioLine, PlayError> {
        GpioLine::new(self.out_gpio)
    }

    pub fn carrier(&self) -> Result<Carrier, PlayError> {
        Carrier::new(self.carrier, self.duty_cycle)
    }

    pub fn daemon_address(&self) -> DaemonAddress {
        DaemonAddress::new(self.host.clone(), self.port)
    }
}

/// One playback session over a single daemon connection.
pub struct Session<S = TcpStream> {
    args: Cli,
    io: PigpiodIo<S>,
}

impl Session<TcpStream> {
    /// Connect to the daemon named in `args`.
    pub fn connect(args: Cli) -> Result<Self, AppError> {
        let address = args.daemon_address();
        let connection_error = |source| AppError::Connection {
            address: address.to_string(),
            source,
        };

        let mut io = PigpiodIo::connect(&address).map_err(connection_error)?;
        let version = io.daemon_version().map_err(connection_error)?;
        info!("Connected to pigpio daemon {} (version {})", address, version);

        Ok(Self::new(args, io))
    }

    /// Close the daemon connection.
    pub fn stop(self) {
        self.io.close();
    }
}

impl<S: Read + Write> Session<S> {
    pub fn new(args: Cli, io: PigpiodIo<S>) -> Self {
        Self { args, io }
    }

    pub fn args(&self) -> &Cli {
        &self.args
    }

    /// Load the recording and transmit it, always forcing the line low afterwards.
    pub fn play(&mut self) -> Result<PlaybackReport, AppError> {
        let line = self.args.line()?;
        let carrier = self.args.carrier()?;

        let path = resolve_recording_path(&self.args.file);
        let recording = load_recording(&path)?;
        info!(
            "Loaded {} durations from {} (recorded input GPIO: {})",
            recording.pulse_us.len(),
            path.display(),
            recording
                .gpio_in
                .map_or_else(|| "unknown".to_string(), |g| g.to_string())
        );
        if recording.ends_on_mark() {
            debug!("Recording ends on a mark; {} stays high until cleanup", line);
        }

        let mut transmitter = Transmitter::new(&mut self.io, line, carrier);
        let result = transmitter.play(&recording.pulse_us, self.args.repeat);
        transmitter.cleanup();

        let report = result?;
        info!(
            "Playback finished: {} transitions, {} µs per frame, sent {} time(s)",
            report.transitions, report.frame_us, report.repeats
        );
        Ok(report)
    }
}

/// Validate arguments, connect, play and disconnect.
pub fn run(args: Cli) -> Result<PlaybackReport, AppError> {
    let line = args.line()?;
    let carrier = args.carrier()?;
    debug!(
        "Output {} at {} Hz, duty cycle {}",
        line,
        carrier.frequency_hz(),
        carrier.duty_cycle()
    );

    let mut session = Session::connect(args)?;
    let result = session.play();
    if let Err(e) = &result {
        warn!("Playback aborted: {}", e);
    }
    session.stop();
    result
}
