pub mod checksum;
pub mod echo;
pub mod icmp;
mod icmpv4;
mod icmpv6;
pub mod ipv4;
pub mod ipv6;

pub use checksum::checksum;
pub use echo::EchoBody;
pub use icmp::{ChecksumContext, IcmpMessage, IcmpType, IcmpTypes};
pub use icmpv4::build_icmpv4_echo_packet;
pub use icmpv6::build_icmpv6_echo_packet;

/// Filler byte used for echo payloads.
pub const PAYLOAD_FILLER: u8 = b'g';

/// Echo payload of `size` filler bytes.
pub fn filler_payload(size: usize) -> Vec<u8> {
    vec![PAYLOAD_FILLER; size]
}
