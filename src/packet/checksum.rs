//! RFC 1071 one's-complement checksum.

/// Sums `data` as big-endian 16-bit words into a 32-bit accumulator.
///
/// A trailing odd byte is treated as the high half of a final word
/// padded with zero, which is the on-wire layout every ICMP peer expects.
pub(crate) fn sum_words(data: &[u8], mut sum: u32) -> u32 {
    let mut chunks = data.chunks_exact(2);
    for word in &mut chunks {
        sum = sum.wrapping_add(u32::from(u16::from_be_bytes([word[0], word[1]])));
    }
    if let [last] = chunks.remainder() {
        sum = sum.wrapping_add(u32::from(*last) << 8);
    }
    sum
}

/// Folds carries back into the low 16 bits and complements the result.
pub(crate) fn finish(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum >> 16) + (sum & 0xffff);
    }
    !(sum as u16)
}

/// Computes the Internet checksum over `data`.
///
/// The checksum field inside `data` must be zero when building a packet.
/// Running it over a packet that already carries a valid checksum yields `0`.
pub fn checksum(data: &[u8]) -> u16 {
    finish(sum_words(data, 0))
}
