use crate::backoff::BackoffPolicy;
use std::fmt;
use std::time::Duration;

/// Environment key overriding the host of the position source.
pub const HOST_KEY: &str = "AFBGPS_HOST";
/// Environment key overriding the service (port number or name) of the position source.
pub const SERVICE_KEY: &str = "AFBGPS_SERVICE";
/// Environment key that, when present with any value, selects a raw NMEA
/// source. No watch command is sent after connecting in that case.
pub const RAW_NMEA_KEY: &str = "AFBGPS_ISNMEA";

pub const DEFAULT_HOST: &str = "sinagot.net";
pub const DEFAULT_SERVICE: &str = "5001";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to connect to the position stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Host name or address of the source.
    pub host: String,
    /// Port number or service name of the source.
    pub service: String,
    /// Send the gpsd watch command right after connecting.
    pub gpsd_handshake: bool,
    /// Timeout for the connection attempt to a single resolved address.
    pub connect_timeout: Duration,
    pub backoff: BackoffPolicy,
}

impl StreamConfig {
    pub fn new(host: &str, service: &str, gpsd_handshake: bool) -> Self {
        StreamConfig {
            host: host.to_string(),
            service: service.to_string(),
            gpsd_handshake,
            ..Default::default()
        }
    }

    /// Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from a key/value lookup.
    ///
    /// Keys that are missing fall back to their documented defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        StreamConfig {
            host: lookup(HOST_KEY).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            service: lookup(SERVICE_KEY).unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
            gpsd_handshake: lookup(RAW_NMEA_KEY).is_none(),
            ..Default::default()
        }
    }

    /// `host:service` as used in log messages.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.service)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            host: DEFAULT_HOST.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            gpsd_handshake: true,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            backoff: BackoffPolicy::default(),
        }
    }
}

impl fmt::Display for StreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.target(),
            if self.gpsd_handshake { "gpsd" } else { "raw NMEA" }
        )
    }
}
