use crate::packet::{IcmpType, IcmpTypes};
use std::fmt;
use std::net::IpAddr;

/// IP version a probe runs over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IpVersion {
    /// ICMP over IPv4.
    V4,
    /// ICMPv6 over IPv6.
    V6,
}

impl IpVersion {
    pub fn of(addr: &IpAddr) -> IpVersion {
        match addr {
            IpAddr::V4(_) => IpVersion::V4,
            IpAddr::V6(_) => IpVersion::V6,
        }
    }

    /// Reply type the receiver accepts.
    pub fn echo_reply(self) -> IcmpType {
        match self {
            IpVersion::V4 => IcmpTypes::EchoReply,
            IpVersion::V6 => IcmpTypes::Icmpv6EchoReply,
        }
    }

    /// Largest echo payload that still fits one unfragmented-length datagram.
    pub fn max_payload(self) -> usize {
        match self {
            // 65535 total length minus IPv4 and ICMP headers
            IpVersion::V4 => 65507,
            // 65535 payload length minus the ICMPv6 header
            IpVersion::V6 => 65527,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => write!(f, "4"),
            IpVersion::V6 => write!(f, "6"),
        }
    }
}
