use super::event::CorrelationEvent;
use super::session::ProbeSession;
use crate::error::ProbeError;
use crate::packet::{self, ChecksumContext};
use crate::socket::Channel;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Paces echo requests onto the channel.
pub struct Sender<'a> {
    session: &'a ProbeSession,
}

impl<'a> Sender<'a> {
    pub fn new(session: &'a ProbeSession) -> Sender<'a> {
        Sender { session }
    }

    /// Builds the echo request for `sequence`.
    pub fn build_request(&self, sequence: u16, payload: &[u8]) -> Result<Vec<u8>, ProbeError> {
        let identifier = self.session.identifier();
        let packet = match self.session.checksum_context() {
            ChecksumContext::V4 => packet::build_icmpv4_echo_packet(identifier, sequence, payload)?,
            ChecksumContext::V6 {
                source,
                destination,
            } => packet::build_icmpv6_echo_packet(source, destination, identifier, sequence, payload)?,
        };
        Ok(packet)
    }

    /// Sends sequences `1..=count`, reporting each one on `events`.
    ///
    /// A write failure ends the run. Returns early without error when the
    /// event consumer has gone away.
    pub async fn run<C: Channel>(
        &self,
        channel: &C,
        events: &mpsc::Sender<CorrelationEvent>,
    ) -> Result<(), ProbeError> {
        let payload = packet::filler_payload(self.session.payload_size());
        let count = self.session.count();
        for sequence in 1..=count {
            let request = self.build_request(sequence, &payload)?;
            let sent_at = Instant::now();
            channel
                .send(&request)
                .await
                .map_err(|e| ProbeError::transport("failed to send echo request", e))?;
            log::debug!(
                "sent echo request id={} seq={} ({} bytes)",
                self.session.identifier(),
                sequence,
                request.len()
            );
            if events
                .send(CorrelationEvent::Sender { sequence, sent_at })
                .await
                .is_err()
            {
                return Ok(());
            }
            if sequence != count {
                tokio::time::sleep(self.session.interval()).await;
            }
        }
        Ok(())
    }
}
