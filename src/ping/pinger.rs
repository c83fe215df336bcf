use super::{Coordinator, CorrelationEvent, PingResult, ProbeSession};
use crate::config::{Config, IdentifierSource};
use crate::error::ProbeError;
use crate::socket::icmp::AsyncIcmpSocket;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::broadcast;

/// Configuration and execution context for ICMP echo probes.
#[derive(Clone, Debug)]
pub struct Pinger {
    /// Probe parameters, validated when a run starts.
    pub config: Config,
    /// Broadcast sender for per-packet correlation events.
    pub progress_tx: broadcast::Sender<CorrelationEvent>,
}

impl Pinger {
    /// Creates a new `Pinger` for the destination address with default settings.
    pub fn new(dst_ip: IpAddr) -> Pinger {
        let mut config = Config::new(dst_ip.to_string());
        config.ipv6 = dst_ip.is_ipv6();
        Pinger::from_config(config)
    }

    pub fn from_config(config: Config) -> Pinger {
        let (progress_tx, _) = broadcast::channel(256);
        Pinger {
            config,
            progress_tx,
        }
    }

    /// Validates the configuration into an immutable session.
    pub fn session(&self) -> Result<ProbeSession, ProbeError> {
        Ok(ProbeSession::from_config(&self.config)?)
    }

    /// Runs ping synchronously.
    pub fn ping(&self) -> Result<PingResult, ProbeError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| ProbeError::transport("failed to start runtime", e))?;
        runtime.block_on(self.ping_async())
    }

    /// Runs ping asynchronously.
    pub async fn ping_async(&self) -> Result<PingResult, ProbeError> {
        let session = self.session()?;
        let socket = AsyncIcmpSocket::new(&session.icmp_config())
            .map_err(|e| ProbeError::transport("failed to open ICMP socket", e))?;
        Coordinator::new(session, socket)
            .with_progress(self.progress_tx.clone())
            .run()
            .await
    }

    /// Sets the number of echo requests.
    pub fn set_count(&mut self, count: u16) {
        self.config.count = count;
    }
    /// Returns the number of echo requests.
    pub fn get_count(&self) -> u16 {
        self.config.count
    }
    /// Sets the delay between echo requests.
    pub fn set_send_interval(&mut self, interval: Duration) {
        self.config.interval = interval;
    }
    /// Returns the delay between echo requests.
    pub fn get_send_interval(&self) -> Duration {
        self.config.interval
    }
    /// Sets the deadline for a whole run.
    pub fn set_ping_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }
    /// Returns the deadline for a whole run.
    pub fn get_ping_timeout(&self) -> Duration {
        self.config.timeout
    }
    /// Sets the echo payload size in octets.
    pub fn set_payload_size(&mut self, size: usize) {
        self.config.payload_size = size;
    }
    /// Returns the echo payload size in octets.
    pub fn get_payload_size(&self) -> usize {
        self.config.payload_size
    }
    /// Sets the source IP address.
    pub fn set_src_ip(&mut self, src_ip: IpAddr) {
        self.config.source = Some(src_ip);
    }
    /// Returns the source IP address, if one was set.
    pub fn get_src_ip(&self) -> Option<IpAddr> {
        self.config.source
    }
    /// Sets the outbound interface for link-local IPv6 targets.
    pub fn set_interface(&mut self, interface: impl Into<String>) {
        self.config.interface = Some(interface.into());
    }
    /// Sets how the echo identifier is chosen.
    pub fn set_identifier(&mut self, identifier: IdentifierSource) {
        self.config.identifier = identifier;
    }
    /// Returns a receiver for per-packet correlation events.
    pub fn get_progress_receiver(&self) -> broadcast::Receiver<CorrelationEvent> {
        self.progress_tx.subscribe()
    }
}
