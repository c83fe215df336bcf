use std::net::IpAddr;
use std::time::Duration;

/// Correlated echo reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// Echo sequence number
    pub seq: u16,
    /// Address the reply came from
    pub ip_addr: IpAddr,
    /// TTL from the IPv4 header. IPv6 reads carry no header.
    pub ttl: Option<u8>,
    /// Estimated hop count from the source
    pub hop: Option<u8>,
    /// ICMP message size in bytes
    pub size: usize,
    /// Round-trip time, once the matching send has been observed
    pub rtt: Option<Duration>,
    /// Reply for a sequence that was already answered
    pub duplicate: bool,
}
