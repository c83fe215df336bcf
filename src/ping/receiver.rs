use super::event::{CorrelationEvent, Reply};
use super::session::ProbeSession;
use crate::error::DecodeError;
use crate::packet::icmp::ICMP_PACKET_MAX_SIZE;
use crate::packet::{ipv4, IcmpMessage, IcmpType};
use crate::protocol::IpVersion;
use crate::socket::Channel;
use std::fmt;
use std::net::IpAddr;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Why a datagram was dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Discard {
    /// Shorter than an IPv4 header plus an echo header
    Undersized(usize),
    Malformed(DecodeError),
    /// Our own or a peer's echo request
    Request,
    /// Anything other than an echo reply
    NotEchoReply(IcmpType),
    /// Echo reply belonging to another prober
    ForeignIdentifier(u16),
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discard::Undersized(len) => write!(f, "undersized datagram ({} bytes)", len),
            Discard::Malformed(e) => write!(f, "malformed datagram: {}", e),
            Discard::Request => write!(f, "echo request"),
            Discard::NotEchoReply(icmp_type) => write!(f, "ICMP type {}", icmp_type),
            Discard::ForeignIdentifier(id) => write!(f, "foreign identifier {}", id),
        }
    }
}

impl From<DecodeError> for Discard {
    fn from(e: DecodeError) -> Self {
        Discard::Malformed(e)
    }
}

/// Reads the channel and keeps replies addressed to this run.
pub struct Receiver<'a> {
    session: &'a ProbeSession,
}

impl<'a> Receiver<'a> {
    pub fn new(session: &'a ProbeSession) -> Receiver<'a> {
        Receiver { session }
    }

    /// Classifies one datagram as read from the channel.
    pub fn accept(&self, datagram: &[u8], received_at: Instant) -> Result<Reply, Discard> {
        let (message, source, ttl) = match self.session.version() {
            IpVersion::V4 => {
                if datagram.len() < ipv4::MIN_DATAGRAM_LEN {
                    return Err(Discard::Undersized(datagram.len()));
                }
                let source = ipv4::source(datagram).map(IpAddr::V4);
                (ipv4::payload(datagram)?, source, ipv4::ttl(datagram))
            }
            // Raw ICMPv6 reads start at the ICMPv6 header.
            IpVersion::V6 => (datagram, None, None),
        };
        let reply = IcmpMessage::decode(message)?;
        if reply.icmp_type.is_echo_request() {
            return Err(Discard::Request);
        }
        let body = match reply.body {
            Some(body) if reply.icmp_type == self.session.version().echo_reply() => body,
            _ => return Err(Discard::NotEchoReply(reply.icmp_type)),
        };
        if body.identifier != self.session.identifier() {
            return Err(Discard::ForeignIdentifier(body.identifier));
        }
        Ok(Reply {
            sequence: body.sequence,
            received_at,
            source: source.unwrap_or_else(|| self.session.dst_ip()),
            ttl,
            size: message.len(),
        })
    }

    /// Reads until `count` replies were accepted or the channel fails.
    ///
    /// A read failure only ends the loop; the coordinator's deadline covers
    /// replies that never arrive.
    pub async fn run<C: Channel>(&self, channel: &C, events: &mpsc::Sender<CorrelationEvent>) {
        let mut buf = vec![0u8; ICMP_PACKET_MAX_SIZE];
        let mut remaining = self.session.count();
        while remaining > 0 {
            let len = match channel.recv(&mut buf).await {
                Ok(len) => len,
                Err(e) => {
                    log::warn!("receive loop stopped: {}", e);
                    return;
                }
            };
            match self.accept(&buf[..len], Instant::now()) {
                Ok(reply) => {
                    log::debug!("echo reply seq={} from {}", reply.sequence, reply.source);
                    if events.send(CorrelationEvent::Receiver(reply)).await.is_err() {
                        return;
                    }
                    remaining -= 1;
                }
                Err(discard) => log::debug!("discarding datagram: {}", discard),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, IdentifierSource};
    use crate::packet::{build_icmpv4_echo_packet, ChecksumContext, EchoBody, IcmpTypes};
    use crate::ping::testing::{in_ipv4, with_type, ScriptedChannel};

    fn session(count: u16) -> ProbeSession {
        let mut config = Config::new("192.0.2.1");
        config.identifier = IdentifierSource::Fixed(1234);
        config.count = count;
        ProbeSession::from_config(&config).unwrap()
    }

    fn reply(identifier: u16, sequence: u16) -> Vec<u8> {
        let request = build_icmpv4_echo_packet(identifier, sequence, &[]).unwrap();
        in_ipv4(&with_type(request, IcmpTypes::EchoReply))
    }

    async fn collect(session: &ProbeSession, datagrams: Vec<Vec<u8>>) -> Vec<CorrelationEvent> {
        let channel = ScriptedChannel::new(datagrams);
        let (tx, mut rx) = mpsc::channel(16);
        Receiver::new(session).run(&channel, &tx).await;
        drop(tx);
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    }

    #[test]
    fn accepts_matching_reply() {
        let session = session(1);
        let reply = Receiver::new(&session)
            .accept(&reply(1234, 7), Instant::now())
            .unwrap();
        assert_eq!(reply.sequence, 7);
        assert_eq!(reply.ttl, Some(57));
        assert_eq!(reply.size, 8);
        assert_eq!(reply.source, "192.0.2.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn strips_header_with_options() {
        let session = session(1);
        let request = build_icmpv4_echo_packet(1234, 4, &[]).unwrap();
        let message = with_type(request, IcmpTypes::EchoReply);
        let mut datagram = crate::ping::testing::ipv4_header(4 + message.len());
        datagram[0] = 0x46;
        // One word of options: NOP padding
        datagram.extend_from_slice(&[1, 1, 1, 0]);
        datagram.extend_from_slice(&message);
        assert_eq!(datagram.len(), 32);

        let reply = Receiver::new(&session).accept(&datagram, Instant::now()).unwrap();
        assert_eq!(reply.sequence, 4);
        assert_eq!(reply.size, 8);
        assert_eq!(reply.ttl, Some(57));
    }

    #[test]
    fn rejects_foreign_identifier() {
        let session = session(1);
        assert_eq!(
            Receiver::new(&session).accept(&reply(4321, 1), Instant::now()),
            Err(Discard::ForeignIdentifier(4321))
        );
    }

    #[test]
    fn rejects_requests_of_both_families() {
        let session = session(1);
        let receiver = Receiver::new(&session);
        for icmp_type in [IcmpTypes::EchoRequest, IcmpTypes::Icmpv6EchoRequest] {
            let message = IcmpMessage::echo(icmp_type, EchoBody::new(1234, 1, Vec::new()))
                .encode(ChecksumContext::V4)
                .unwrap();
            assert_eq!(
                receiver.accept(&in_ipv4(&message), Instant::now()),
                Err(Discard::Request)
            );
        }
    }

    #[test]
    fn rejects_undersized_datagrams() {
        let session = session(1);
        let full = reply(1234, 1);
        assert_eq!(full.len(), 28);
        assert_eq!(
            Receiver::new(&session).accept(&full[..27], Instant::now()),
            Err(Discard::Undersized(27))
        );
    }

    #[test]
    fn rejects_other_icmp_types() {
        let session = session(1);
        // Destination unreachable quoting our request
        let mut message = vec![3u8, 3, 0, 0, 0, 0, 0, 0];
        message.extend_from_slice(&reply(1234, 1)[..20]);
        assert_eq!(
            Receiver::new(&session).accept(&in_ipv4(&message), Instant::now()),
            Err(Discard::NotEchoReply(crate::packet::IcmpType(3)))
        );
    }

    #[test]
    fn rejects_reply_of_other_family() {
        let session = session(1);
        let message = IcmpMessage::echo(IcmpTypes::Icmpv6EchoReply, EchoBody::new(1234, 1, Vec::new()))
            .encode(ChecksumContext::V4)
            .unwrap();
        assert_eq!(
            Receiver::new(&session).accept(&in_ipv4(&message), Instant::now()),
            Err(Discard::NotEchoReply(IcmpTypes::Icmpv6EchoReply))
        );
    }

    #[test]
    fn checksum_is_not_verified() {
        let session = session(1);
        let mut datagram = reply(1234, 2);
        datagram[22] ^= 0xff;
        assert!(Receiver::new(&session).accept(&datagram, Instant::now()).is_ok());
    }

    #[test]
    fn ipv6_reads_have_no_ip_header() {
        let mut config = Config::new("2001:db8::2");
        config.ipv6 = true;
        config.source = Some("2001:db8::1".parse().unwrap());
        config.identifier = IdentifierSource::Fixed(1234);
        let session = ProbeSession::from_config(&config).unwrap();
        let message = IcmpMessage::echo(IcmpTypes::Icmpv6EchoReply, EchoBody::new(1234, 3, vec![0; 4]))
            .encode(session.checksum_context())
            .unwrap();
        let reply = Receiver::new(&session).accept(&message, Instant::now()).unwrap();
        assert_eq!(reply.sequence, 3);
        assert_eq!(reply.ttl, None);
        assert_eq!(reply.source, session.dst_ip());
    }

    #[tokio::test]
    async fn foreign_traffic_produces_no_events() {
        let session = session(2);
        let events = collect(&session, vec![reply(999, 1), reply(1000, 2)]).await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn stops_after_requested_count() {
        let session = session(2);
        let datagrams = vec![
            reply(1234, 2),
            vec![0x45; 10],
            reply(4321, 1),
            reply(1234, 1),
            reply(1234, 3),
        ];
        let events = collect(&session, datagrams).await;
        let sequences: Vec<u16> = events.iter().map(CorrelationEvent::sequence).collect();
        assert_eq!(sequences, vec![2, 1]);
        assert!(events.iter().all(CorrelationEvent::is_reply));
    }

    #[tokio::test]
    async fn undersized_datagram_does_not_count() {
        let session = session(1);
        let short = reply(1234, 1)[..27].to_vec();
        let events = collect(&session, vec![short, reply(1234, 1)]).await;
        assert_eq!(events.len(), 1);
    }
}
