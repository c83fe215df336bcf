use std::net::IpAddr;
use tokio::time::Instant;

/// Echo reply accepted by the receiver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub sequence: u16,
    /// When the datagram was read
    pub received_at: Instant,
    pub source: IpAddr,
    pub ttl: Option<u8>,
    /// ICMP message size in bytes
    pub size: usize,
}

/// Progress signal from one of the two workers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorrelationEvent {
    /// An echo request was written to the channel.
    Sender { sequence: u16, sent_at: Instant },
    /// A matching echo reply was read from the channel.
    Receiver(Reply),
}

impl CorrelationEvent {
    pub fn sequence(&self) -> u16 {
        match self {
            CorrelationEvent::Sender { sequence, .. } => *sequence,
            CorrelationEvent::Receiver(reply) => reply.sequence,
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self, CorrelationEvent::Receiver(_))
    }
}
