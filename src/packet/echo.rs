use crate::error::DecodeError;

/// Length of the identifier and sequence fields.
pub const ECHO_HEADER_LEN: usize = 4;

/// Body of an ICMP echo request or reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EchoBody {
    /// Correlation tag shared by every packet of one probe run
    pub identifier: u16,
    /// Per-packet counter, starting at 1
    pub sequence: u16,
    /// Opaque data echoed back by the peer
    pub payload: Vec<u8>,
}

impl EchoBody {
    pub fn new(identifier: u16, sequence: u16, payload: Vec<u8>) -> EchoBody {
        EchoBody {
            identifier,
            sequence,
            payload,
        }
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        ECHO_HEADER_LEN + self.payload.len()
    }

    /// Appends the wire encoding of this body to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.reserve(self.len());
        buf.extend_from_slice(&self.identifier.to_be_bytes());
        buf.extend_from_slice(&self.sequence.to_be_bytes());
        buf.extend_from_slice(&self.payload);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        self.encode_into(&mut buf);
        buf
    }

    /// Parses the bytes following the 4-byte ICMP header.
    pub fn decode(buf: &[u8]) -> Result<EchoBody, DecodeError> {
        if buf.len() < ECHO_HEADER_LEN {
            return Err(DecodeError::TruncatedBody { len: buf.len() });
        }
        Ok(EchoBody {
            identifier: u16::from_be_bytes([buf[0], buf[1]]),
            sequence: u16::from_be_bytes([buf[2], buf[3]]),
            payload: buf[ECHO_HEADER_LEN..].to_vec(),
        })
    }
}
