//! Runtime configuration: daemon address and per-user directories.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;

/// Host the pigpio daemon listens on when `PIGPIO_ADDR` is unset
pub const DEFAULT_DAEMON_HOST: &str = "localhost";

/// Port the pigpio daemon listens on when `PIGPIO_PORT` is unset
pub const DEFAULT_DAEMON_PORT: u16 = 8888;

/// How long to wait for the daemon to accept a connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// How long to wait for a single command response
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

pub fn get_project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "irplay", "irplay")
}

/// Directory searched for recordings given by bare name
pub fn recordings_dir() -> Option<PathBuf> {
    get_project_dirs().map(|dirs| dirs.data_dir().join("recordings"))
}

/// Where to reach the pigpio daemon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonAddress {
    pub host: String,
    pub port: u16,
}

impl DaemonAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for DaemonAddress {
    fn default() -> Self {
        Self::new(DEFAULT_DAEMON_HOST, DEFAULT_DAEMON_PORT)
    }
}

impl fmt::Display for DaemonAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address() {
        let addr = DaemonAddress::default();
        assert_eq!(addr.to_string(), "localhost:8888");
    }

    #[test]
    fn test_ipv6_address_is_bracketed() {
        let addr = DaemonAddress::new("::1", 8888);
        assert_eq!(addr.to_string(), "[::1]:8888");
    }

    #[test]
    fn test_recordings_dir_name() {
        if let Some(dir) = recordings_dir() {
            assert!(dir.ends_with("recordings"));
        }
    }
}
