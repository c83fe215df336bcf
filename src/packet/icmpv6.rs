use super::icmp::{ChecksumContext, IcmpMessage, IcmpTypes};
use super::EchoBody;
use crate::error::EncodeError;
use std::net::Ipv6Addr;

/// Builds an ICMPv6 echo request whose checksum covers the pseudo-header.
pub fn build_icmpv6_echo_packet(
    source: Ipv6Addr,
    destination: Ipv6Addr,
    identifier: u16,
    sequence: u16,
    payload: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    let body = EchoBody::new(identifier, sequence, payload.to_vec());
    IcmpMessage::echo(IcmpTypes::Icmpv6EchoRequest, body).encode(ChecksumContext::V6 {
        source,
        destination,
    })
}
