//! pigpio daemon implementation of WaveIo.
//!
//! This module provides `PigpiodIo` which implements `irplay_core::WaveIo`
//! by speaking the pigpiod socket protocol directly.
//!
//! ## Wire format
//!
//! ```text
//! request:  cmd:u32 | p1:u32 | p2:u32 | p3:u32 | extension (p3 bytes)
//! response: cmd:u32 | p1:u32 | p2:u32 | res:i32
//! ```
//!
//! All fields are little-endian. Negative `res` values are pigpio error codes.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};

use irplay_core::io::{GpioLine, IoError, Level, PinMode, Pulse, WaveId, WaveIo};
use log::{debug, trace};
use socket2::{Domain, Protocol, Socket, Type};

use crate::config::{DaemonAddress, COMMAND_TIMEOUT, CONNECT_TIMEOUT};

/// Command request header size in bytes
pub const COMMAND_LEN: usize = 16;

/// Response size in bytes
pub const RESPONSE_LEN: usize = 16;

/// Size of one `gpioPulse_t` in a WVAG extension
pub const PULSE_WIRE_LEN: usize = 12;

/// pigpiod command numbers
pub mod cmd {
    pub const MODES: u32 = 0;
    pub const WRITE: u32 = 4;
    pub const PIGPV: u32 = 26;
    pub const WVCLR: u32 = 27;
    pub const WVAG: u32 = 28;
    pub const WVBSY: u32 = 32;
    pub const WVCRE: u32 = 49;
    pub const WVDEL: u32 = 50;
    pub const WVTX: u32 = 51;
}

/// Readable name for the pigpio error codes this client can run into.
pub fn error_text(code: i32) -> &'static str {
    match code {
        -2 => "PI_BAD_USER_GPIO: gpio not 0-31",
        -3 => "PI_BAD_GPIO: gpio not 0-53",
        -4 => "PI_BAD_MODE: mode not 0-7",
        -5 => "PI_BAD_LEVEL: level not 0-1",
        -36 => "PI_TOO_MANY_PULSES: waveform has too many pulses",
        -41 => "PI_NOT_PERMITTED: gpio operation not permitted",
        -66 => "PI_BAD_WAVE_ID: non existent wave id",
        -67 => "PI_TOO_MANY_CBS: no more control blocks for waveform",
        -68 => "PI_TOO_MANY_OOL: no more OOL for waveform",
        -69 => "PI_EMPTY_WAVEFORM: attempt to create an empty waveform",
        -70 => "PI_NO_WAVEFORM_ID: no more waveforms",
        _ => "unknown pigpio error",
    }
}

/// Build a request: header followed by `ext`, whose length goes in `p3`.
pub fn encode_command(cmd: u32, p1: u32, p2: u32, ext: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(COMMAND_LEN + ext.len());
    buf.extend_from_slice(&cmd.to_le_bytes());
    buf.extend_from_slice(&p1.to_le_bytes());
    buf.extend_from_slice(&p2.to_le_bytes());
    buf.extend_from_slice(&(ext.len() as u32).to_le_bytes());
    buf.extend_from_slice(ext);
    buf
}

/// Serialise pulses as consecutive `gpioPulse_t` records.
pub fn encode_pulses(pulses: &[Pulse]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(pulses.len() * PULSE_WIRE_LEN);
    for pulse in pulses {
        buf.extend_from_slice(&pulse.gpio_on.to_le_bytes());
        buf.extend_from_slice(&pulse.gpio_off.to_le_bytes());
        buf.extend_from_slice(&pulse.delay_us.to_le_bytes());
    }
    buf
}

/// Extract the signed result from a response.
pub fn decode_result(response: &[u8; RESPONSE_LEN]) -> i32 {
    i32::from_le_bytes([response[12], response[13], response[14], response[15]])
}

fn map_io_error(context: &str, e: std::io::Error) -> IoError {
    match e.kind() {
        ErrorKind::WouldBlock | ErrorKind::TimedOut => IoError::timed_out(),
        ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::BrokenPipe => {
            IoError::new(-1, format!("{}: connection closed by daemon", context))
        }
        _ => IoError::new(-1, format!("{}: {}", context, e)),
    }
}

/// Connection to a pigpio daemon.
///
/// Generic over the byte stream so tests can substitute an in-memory script.
///
/// # Usage
///
/// ```rust,ignore
/// use irplay::config::DaemonAddress;
/// use irplay::pigpiod_io::PigpiodIo;
///
/// let mut io = PigpiodIo::connect(&DaemonAddress::default())?;
/// println!("pigpio version {}", io.daemon_version()?);
/// io.close();
/// ```
pub struct PigpiodIo<S = TcpStream> {
    stream: S,
}

impl PigpiodIo<TcpStream> {
    /// Open a command connection to the daemon.
    pub fn connect(address: &DaemonAddress) -> Result<Self, IoError> {
        let candidates: Vec<SocketAddr> = (address.host.as_str(), address.port)
            .to_socket_addrs()
            .map_err(|e| IoError::new(-1, format!("Cannot resolve {}: {}", address, e)))?
            .collect();

        let mut last_error = IoError::new(-1, format!("No addresses found for {}", address));
        for addr in candidates {
            match Self::connect_addr(&addr) {
                Ok(stream) => {
                    debug!("Connected to pigpio daemon at {}", addr);
                    return Ok(Self::from_stream(stream));
                }
                Err(e) => {
                    debug!("Connecting to {} failed: {}", addr, e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }

    fn connect_addr(addr: &SocketAddr) -> Result<TcpStream, IoError> {
        let socket = Socket::new(Domain::for_address(*addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(|e| IoError::new(-1, format!("Failed to create socket: {}", e)))?;

        socket
            .set_nodelay(true)
            .map_err(|e| IoError::new(-1, format!("Failed to set no-delay: {}", e)))?;

        socket
            .connect_timeout(&(*addr).into(), CONNECT_TIMEOUT)
            .map_err(|e| map_io_error("connect", e))?;

        socket
            .set_read_timeout(Some(COMMAND_TIMEOUT))
            .map_err(|e| IoError::new(-1, format!("Failed to set read timeout: {}", e)))?;
        socket
            .set_write_timeout(Some(COMMAND_TIMEOUT))
            .map_err(|e| IoError::new(-1, format!("Failed to set write timeout: {}", e)))?;

        Ok(socket.into())
    }

    /// Tear down the connection.
    pub fn close(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            trace!("Socket shutdown: {}", e);
        }
        debug!("Disconnected from pigpio daemon");
    }
}

impl<S: Read + Write> PigpiodIo<S> {
    pub fn from_stream(stream: S) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Send one command and return the raw signed result.
    fn command(&mut self, cmd: u32, p1: u32, p2: u32, ext: &[u8]) -> Result<i32, IoError> {
        let request = encode_command(cmd, p1, p2, ext);
        self.stream
            .write_all(&request)
            .map_err(|e| map_io_error("send", e))?;

        let mut response = [0u8; RESPONSE_LEN];
        self.stream
            .read_exact(&mut response)
            .map_err(|e| map_io_error("receive", e))?;

        let res = decode_result(&response);
        trace!("cmd {} ({}, {}, +{} bytes) -> {}", cmd, p1, p2, ext.len(), res);
        Ok(res)
    }

    /// Like `command`, but negative results become errors.
    fn checked(&mut self, cmd: u32, p1: u32, p2: u32, ext: &[u8]) -> Result<u32, IoError> {
        let res = self.command(cmd, p1, p2, ext)?;
        if res < 0 {
            return Err(IoError::new(res, error_text(res)));
        }
        Ok(res as u32)
    }

    /// pigpio library version reported by the daemon.
    pub fn daemon_version(&mut self) -> Result<u32, IoError> {
        self.checked(cmd::PIGPV, 0, 0, &[])
    }
}

impl<S: Read + Write> WaveIo for PigpiodIo<S> {
    fn set_mode(&mut self, line: GpioLine, mode: PinMode) -> Result<(), IoError> {
        self.checked(cmd::MODES, line.number(), mode as u32, &[])
            .map(|_| ())
    }

    fn write(&mut self, line: GpioLine, level: Level) -> Result<(), IoError> {
        self.checked(cmd::WRITE, line.number(), level as u32, &[])
            .map(|_| ())
    }

    fn wave_clear(&mut self) -> Result<(), IoError> {
        self.checked(cmd::WVCLR, 0, 0, &[]).map(|_| ())
    }

    fn wave_register(&mut self, pulses: &[Pulse]) -> Result<i32, IoError> {
        // An empty list is never sent; creation then reports the empty wave
        if !pulses.is_empty() {
            let total = self.command(cmd::WVAG, 0, 0, &encode_pulses(pulses))?;
            if total < 0 {
                debug!("Adding {} pulses failed: {}", pulses.len(), error_text(total));
                return Ok(total);
            }
            debug!("Added {} pulses, waveform now holds {}", pulses.len(), total);
        }

        let res = self.command(cmd::WVCRE, 0, 0, &[])?;
        if res < 0 {
            debug!("Creating waveform failed: {}", error_text(res));
        }
        Ok(res)
    }

    fn wave_send_once(&mut self, wave: WaveId) -> Result<(), IoError> {
        self.checked(cmd::WVTX, wave.0, 0, &[]).map(|_| ())
    }

    fn wave_tx_busy(&mut self) -> Result<bool, IoError> {
        self.checked(cmd::WVBSY, 0, 0, &[]).map(|busy| busy != 0)
    }

    fn wave_delete(&mut self, wave: WaveId) -> Result<(), IoError> {
        self.checked(cmd::WVDEL, wave.0, 0, &[]).map(|_| ())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedStream;
    use super::*;

    fn line() -> GpioLine {
        GpioLine::new(12).unwrap()
    }

    #[test]
    fn test_encode_command_layout() {
        let buf = encode_command(cmd::WRITE, 12, 1, &[]);
        assert_eq!(
            buf,
            vec![4, 0, 0, 0, 12, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_command_with_extension() {
        let buf = encode_command(cmd::WVAG, 0, 0, &[0xAA; 24]);
        assert_eq!(buf.len(), COMMAND_LEN + 24);
        assert_eq!(&buf[12..16], &24u32.to_le_bytes());
        assert_eq!(&buf[16..], &[0xAA; 24]);
    }

    #[test]
    fn test_encode_pulses_layout() {
        let buf = encode_pulses(&[Pulse::high(line(), 8), Pulse::low(line(), 18)]);
        assert_eq!(buf.len(), 2 * PULSE_WIRE_LEN);
        assert_eq!(&buf[0..4], &0x1000u32.to_le_bytes());
        assert_eq!(&buf[4..8], &0u32.to_le_bytes());
        assert_eq!(&buf[8..12], &8u32.to_le_bytes());
        assert_eq!(&buf[12..16], &0u32.to_le_bytes());
        assert_eq!(&buf[16..20], &0x1000u32.to_le_bytes());
        assert_eq!(&buf[20..24], &18u32.to_le_bytes());
    }

    #[test]
    fn test_decode_result_is_signed() {
        let mut response = [0u8; RESPONSE_LEN];
        response[12..16].copy_from_slice(&(-70i32).to_le_bytes());
        assert_eq!(decode_result(&response), -70);
        response[12..16].copy_from_slice(&5i32.to_le_bytes());
        assert_eq!(decode_result(&response), 5);
    }

    #[test]
    fn test_line_commands() {
        let mut io = PigpiodIo::from_stream(ScriptedStream::new(&[0, 0]));
        io.set_mode(line(), PinMode::Output).unwrap();
        io.write(line(), Level::Low).unwrap();

        let requests = io.into_inner().requests();
        assert_eq!(requests[0], (cmd::MODES, 12, 1, vec![]));
        assert_eq!(requests[1], (cmd::WRITE, 12, 0, vec![]));
    }

    #[test]
    fn test_negative_result_is_error() {
        let mut io = PigpiodIo::from_stream(ScriptedStream::new(&[-41]));
        let err = io.write(line(), Level::High).unwrap_err();
        assert_eq!(err.code, -41);
        assert!(err.message.starts_with("PI_NOT_PERMITTED"));
    }

    #[test]
    fn test_register_adds_then_creates() {
        let pulses = [Pulse::high(line(), 8), Pulse::low(line(), 18)];
        let mut io = PigpiodIo::from_stream(ScriptedStream::new(&[2, 0]));
        assert_eq!(io.wave_register(&pulses).unwrap(), 0);

        let requests = io.into_inner().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, cmd::WVAG);
        assert_eq!(requests[0].3, encode_pulses(&pulses));
        assert_eq!(requests[1].0, cmd::WVCRE);
    }

    #[test]
    fn test_register_passes_rejection_through() {
        let pulses = [Pulse::high(line(), 8)];
        let mut io = PigpiodIo::from_stream(ScriptedStream::new(&[-36]));
        assert_eq!(io.wave_register(&pulses).unwrap(), -36);
        assert_eq!(io.into_inner().commands(), vec![cmd::WVAG]);
    }

    #[test]
    fn test_register_empty_skips_add() {
        let mut io = PigpiodIo::from_stream(ScriptedStream::new(&[-69]));
        assert_eq!(io.wave_register(&[]).unwrap(), -69);
        assert_eq!(io.into_inner().commands(), vec![cmd::WVCRE]);
    }

    #[test]
    fn test_busy_and_wave_commands() {
        let mut io = PigpiodIo::from_stream(ScriptedStream::new(&[0, 1, 0, 0]));
        io.wave_send_once(WaveId(3)).unwrap();
        assert!(io.wave_tx_busy().unwrap());
        assert!(!io.wave_tx_busy().unwrap());
        io.wave_delete(WaveId(3)).unwrap();

        let requests = io.into_inner().requests();
        assert_eq!(requests[0], (cmd::WVTX, 3, 0, vec![]));
        assert_eq!(requests[1].0, cmd::WVBSY);
        assert_eq!(requests[3], (cmd::WVDEL, 3, 0, vec![]));
    }

    #[test]
    fn test_closed_connection_is_error() {
        let mut io = PigpiodIo::from_stream(ScriptedStream::new(&[]));
        let err = io.wave_tx_busy().unwrap_err();
        assert_eq!(err.code, -1);
        assert!(err.message.contains("connection closed"));
    }

    #[test]
    fn test_daemon_version() {
        let mut io = PigpiodIo::from_stream(ScriptedStream::new(&[79]));
        assert_eq!(io.daemon_version().unwrap(), 79);
    }

    #[test]
    fn test_error_text() {
        assert!(error_text(-70).contains("no more waveforms"));
        assert_eq!(error_text(-999), "unknown pigpio error");
    }
}
