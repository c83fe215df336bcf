use super::icmp::{ChecksumContext, IcmpMessage, IcmpTypes};
use super::EchoBody;
use crate::error::EncodeError;

/// Builds an ICMPv4 echo request ready for a raw socket.
pub fn build_icmpv4_echo_packet(
    identifier: u16,
    sequence: u16,
    payload: &[u8],
) -> Result<Vec<u8>, EncodeError> {
    let body = EchoBody::new(identifier, sequence, payload.to_vec());
    IcmpMessage::echo(IcmpTypes::EchoRequest, body).encode(ChecksumContext::V4)
}
