pub mod icmp;

use crate::protocol::IpVersion;
use std::future::Future;
use std::io;

/// Bidirectional datagram channel connected to one remote host.
///
/// Sends and receives may be in flight at the same time from different
/// workers; implementations must not serialize the two directions.
pub trait Channel {
    /// Writes one datagram.
    fn send(&self, buf: &[u8]) -> impl Future<Output = io::Result<usize>>;

    /// Reads one datagram into `buf` and returns its length.
    ///
    /// For IPv4 raw channels the datagram starts with the IP header; IPv6
    /// channels deliver the ICMPv6 message alone.
    fn recv(&self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketFamily {
    Ipv4,
    Ipv6,
}

impl SocketFamily {
    pub fn from_version(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => SocketFamily::Ipv4,
            IpVersion::V6 => SocketFamily::Ipv6,
        }
    }

    pub fn is_v4(&self) -> bool {
        matches!(self, SocketFamily::Ipv4)
    }

    pub fn to_domain(&self) -> socket2::Domain {
        match self {
            SocketFamily::Ipv4 => socket2::Domain::IPV4,
            SocketFamily::Ipv6 => socket2::Domain::IPV6,
        }
    }

    pub fn to_protocol(&self) -> socket2::Protocol {
        match self {
            SocketFamily::Ipv4 => socket2::Protocol::ICMPV4,
            SocketFamily::Ipv6 => socket2::Protocol::ICMPV6,
        }
    }
}
