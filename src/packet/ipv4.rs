use crate::error::DecodeError;

/// Minimum IPv4 header length.
pub const IPV4_HEADER_LEN: usize = 20;
/// Smallest datagram worth decoding: minimal IPv4 header plus an 8-byte ICMP echo header.
pub const MIN_DATAGRAM_LEN: usize = IPV4_HEADER_LEN + 8;

/// Header length declared by the IHL nibble, in bytes.
pub fn header_len(datagram: &[u8]) -> usize {
    datagram.first().map_or(0, |b| usize::from(b & 0x0f) * 4)
}

/// Returns the bytes following the IPv4 header.
pub fn payload(datagram: &[u8]) -> Result<&[u8], DecodeError> {
    let header_len = header_len(datagram);
    if header_len < IPV4_HEADER_LEN {
        return Err(DecodeError::InvalidIhl { header_len });
    }
    if header_len > datagram.len() {
        return Err(DecodeError::TruncatedIpHeader {
            header_len,
            len: datagram.len(),
        });
    }
    Ok(&datagram[header_len..])
}

/// TTL of a received datagram.
pub fn ttl(datagram: &[u8]) -> Option<u8> {
    datagram.get(8).copied()
}

/// Source address of a received datagram.
pub fn source(datagram: &[u8]) -> Option<std::net::Ipv4Addr> {
    let octets: [u8; 4] = datagram.get(12..16)?.try_into().ok()?;
    Some(std::net::Ipv4Addr::from(octets))
}

/// Initial TTL the peer most likely used.
pub fn guess_initial_ttl(ttl: u8) -> u8 {
    if ttl <= 64 {
        64
    } else if ttl <= 128 {
        128
    } else {
        255
    }
}
