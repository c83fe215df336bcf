use super::checksum;
use std::net::Ipv6Addr;

/// Next-header value for ICMPv6.
pub const IPPROTO_ICMPV6: u8 = 58;

/// IPv6 pseudo-header covered by the ICMPv6 checksum. Never transmitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PseudoHeader {
    pub source: Ipv6Addr,
    pub destination: Ipv6Addr,
    pub upper_layer_length: u32,
    pub next_header: u8,
}

impl PseudoHeader {
    pub fn new(source: Ipv6Addr, destination: Ipv6Addr, upper_layer_length: u32) -> PseudoHeader {
        PseudoHeader {
            source,
            destination,
            upper_layer_length,
            next_header: IPPROTO_ICMPV6,
        }
    }

    /// 40-byte wire image: addresses, 32-bit length, 3 zero bytes, next header.
    pub fn to_bytes(&self) -> [u8; 40] {
        let mut buf = [0u8; 40];
        buf[0..16].copy_from_slice(&self.source.octets());
        buf[16..32].copy_from_slice(&self.destination.octets());
        buf[32..36].copy_from_slice(&self.upper_layer_length.to_be_bytes());
        buf[39] = self.next_header;
        buf
    }

    /// Checksum over this pseudo-header followed by `message`.
    pub fn checksum(&self, message: &[u8]) -> u16 {
        let sum = checksum::sum_words(&self.to_bytes(), 0);
        checksum::finish(checksum::sum_words(message, sum))
    }
}
