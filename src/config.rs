use std::net::IpAddr;
use std::time::Duration;

/// Default number of echo requests.
pub const DEFAULT_COUNT: u16 = 5;
/// Default delay between echo requests.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);
/// Default deadline for a whole run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
/// Default echo payload size in octets (64-byte ICMP message).
pub const DEFAULT_PAYLOAD_SIZE: usize = 56;

/// How the echo identifier is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierSource {
    /// Process id masked to 16 bits
    #[default]
    ProcessId,
    /// Random per run, for several concurrent runs in one process
    Random,
    /// Fixed value
    Fixed(u16),
}

impl IdentifierSource {
    pub fn resolve(self) -> u16 {
        match self {
            IdentifierSource::ProcessId => (std::process::id() & 0xffff) as u16,
            IdentifierSource::Random => rand::random::<u16>(),
            IdentifierSource::Fixed(id) => id,
        }
    }
}

/// Probe configuration as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Target address literal
    pub host: String,
    /// Number of echo requests to send
    pub count: u16,
    /// Delay between echo requests
    pub interval: Duration,
    /// Deadline for the whole run
    pub timeout: Duration,
    /// Echo payload size in octets
    pub payload_size: usize,
    /// Probe over ICMPv6
    pub ipv6: bool,
    /// Outbound interface (name or index) for link-local IPv6 targets
    pub interface: Option<String>,
    /// Source address for binding and the ICMPv6 pseudo-header
    pub source: Option<IpAddr>,
    pub identifier: IdentifierSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::new(),
            count: DEFAULT_COUNT,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            payload_size: DEFAULT_PAYLOAD_SIZE,
            ipv6: false,
            interface: None,
            source: None,
            identifier: IdentifierSource::default(),
        }
    }
}

impl Config {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }
}
