use super::checksum::checksum;
use super::echo::EchoBody;
use super::ipv6::PseudoHeader;
use crate::error::{DecodeError, EncodeError};
use std::fmt;
use std::net::Ipv6Addr;

/// Fixed ICMP header: type, code, checksum.
pub const ICMP_HEADER_LEN: usize = 4;
/// Largest ICMP message that fits an IP datagram.
pub const ICMP_PACKET_MAX_SIZE: usize = 65535;

/// ICMP message type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IcmpType(pub u8);

/// Echo message types for both IP versions.
#[allow(non_snake_case)]
#[allow(non_upper_case_globals)]
pub mod IcmpTypes {
    use super::IcmpType;

    pub const EchoReply: IcmpType = IcmpType(0);
    pub const EchoRequest: IcmpType = IcmpType(8);
    pub const Icmpv6EchoRequest: IcmpType = IcmpType(128);
    pub const Icmpv6EchoReply: IcmpType = IcmpType(129);
}

impl IcmpType {
    pub fn is_echo(self) -> bool {
        self.is_echo_request() || self.is_echo_reply()
    }

    pub fn is_echo_request(self) -> bool {
        self == IcmpTypes::EchoRequest || self == IcmpTypes::Icmpv6EchoRequest
    }

    pub fn is_echo_reply(self) -> bool {
        self == IcmpTypes::EchoReply || self == IcmpTypes::Icmpv6EchoReply
    }
}

impl fmt::Display for IcmpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the checksum of an outgoing message covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumContext {
    /// The ICMP message alone.
    V4,
    /// IPv6 pseudo-header followed by the ICMPv6 message.
    V6 {
        source: Ipv6Addr,
        destination: Ipv6Addr,
    },
}

/// A decoded or to-be-encoded ICMP message.
///
/// `checksum` is informational: `encode` always recomputes it, and `decode`
/// reports what was on the wire without verifying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IcmpMessage {
    pub icmp_type: IcmpType,
    pub code: u8,
    pub checksum: u16,
    pub body: Option<EchoBody>,
}

impl IcmpMessage {
    pub fn echo(icmp_type: IcmpType, body: EchoBody) -> IcmpMessage {
        IcmpMessage {
            icmp_type,
            code: 0,
            checksum: 0,
            body: Some(body),
        }
    }

    pub fn len(&self) -> usize {
        ICMP_HEADER_LEN + self.body.as_ref().map_or(0, EchoBody::len)
    }

    /// Serializes the message and fills in the checksum.
    pub fn encode(&self, context: ChecksumContext) -> Result<Vec<u8>, EncodeError> {
        let len = self.len();
        if len > ICMP_PACKET_MAX_SIZE {
            return Err(EncodeError::TooLarge { len });
        }
        let mut buf = Vec::with_capacity(len);
        buf.extend_from_slice(&[self.icmp_type.0, self.code, 0, 0]);
        if let Some(body) = &self.body {
            body.encode_into(&mut buf);
        }
        let sum = match context {
            ChecksumContext::V4 => checksum(&buf),
            ChecksumContext::V6 {
                source,
                destination,
            } => PseudoHeader::new(source, destination, buf.len() as u32).checksum(&buf),
        };
        buf[2..4].copy_from_slice(&sum.to_be_bytes());
        Ok(buf)
    }

    /// Parses an ICMP message without its IP header.
    pub fn decode(buf: &[u8]) -> Result<IcmpMessage, DecodeError> {
        if buf.len() < ICMP_HEADER_LEN {
            return Err(DecodeError::TooShort { len: buf.len() });
        }
        let icmp_type = IcmpType(buf[0]);
        let body = if buf.len() > ICMP_HEADER_LEN && icmp_type.is_echo() {
            Some(EchoBody::decode(&buf[ICMP_HEADER_LEN..])?)
        } else {
            None
        };
        Ok(IcmpMessage {
            icmp_type,
            code: buf[1],
            checksum: u16::from_be_bytes([buf[2], buf[3]]),
            body,
        })
    }
}
