use super::event::{CorrelationEvent, Reply};
use super::receiver::Receiver;
use super::sender::Sender;
use super::session::ProbeSession;
use super::stats::PingStatistics;
use super::{PingResult, PingStatus};
use crate::error::{ConfigError, ProbeError};
use crate::node::Node;
use crate::packet::ipv4::guess_initial_ttl;
use crate::socket::Channel;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

/// Lifecycle of a probe run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Running,
    Draining,
    Done,
}

fn transition(state: &mut ProbeState, next: ProbeState) {
    log::debug!("probe state {:?} -> {:?}", state, next);
    *state = next;
}

fn send_progress(progress_tx: Option<&broadcast::Sender<CorrelationEvent>>, event: &CorrelationEvent) {
    if let Some(tx) = progress_tx {
        let _ = tx.send(event.clone());
    }
}

/// Pairs send and reply events by sequence number, in any arrival order.
#[derive(Debug)]
struct Correlator {
    owed: u16,
    transmitted: u16,
    sent: HashMap<u16, Instant>,
    answered: HashSet<u16>,
    nodes: Vec<Node>,
    /// Replies seen before their send event: node index and receive time
    waiting: Vec<(usize, Instant)>,
}

impl Correlator {
    fn new(count: u16) -> Correlator {
        Correlator {
            owed: count,
            transmitted: 0,
            sent: HashMap::new(),
            answered: HashSet::new(),
            nodes: Vec::new(),
            waiting: Vec::new(),
        }
    }

    /// Records `event`; returns true once every owed reply has arrived.
    fn observe(&mut self, event: &CorrelationEvent) -> bool {
        match event {
            CorrelationEvent::Sender { sequence, sent_at } => {
                self.transmitted = self.transmitted.saturating_add(1);
                self.sent.insert(*sequence, *sent_at);
                let nodes = &mut self.nodes;
                self.waiting.retain(|(index, received_at)| {
                    let node = &mut nodes[*index];
                    if node.seq != *sequence {
                        return true;
                    }
                    node.rtt = Some(received_at.saturating_duration_since(*sent_at));
                    false
                });
            }
            CorrelationEvent::Receiver(reply) => {
                self.record_reply(reply);
                self.owed = self.owed.saturating_sub(1);
            }
        }
        self.owed == 0
    }

    /// True when every reply seen so far has been paired with its send.
    fn settled(&self) -> bool {
        self.waiting.is_empty()
    }

    fn record_reply(&mut self, reply: &Reply) {
        let duplicate = !self.answered.insert(reply.sequence);
        if duplicate {
            log::debug!("duplicate reply for seq={}", reply.sequence);
        }
        let rtt = self
            .sent
            .get(&reply.sequence)
            .map(|sent_at| reply.received_at.saturating_duration_since(*sent_at));
        if rtt.is_none() {
            self.waiting.push((self.nodes.len(), reply.received_at));
        }
        self.nodes.push(Node {
            seq: reply.sequence,
            ip_addr: reply.source,
            ttl: reply.ttl,
            hop: reply.ttl.map(|ttl| guess_initial_ttl(ttl) - ttl),
            size: reply.size,
            rtt,
            duplicate,
        });
    }

    fn finish(self, status: PingStatus, probe_time: Duration, error: Option<String>) -> PingResult {
        let statistics = PingStatistics::new(self.transmitted, &self.nodes);
        PingResult {
            results: self.nodes,
            status,
            probe_time,
            statistics,
            error,
        }
    }
}

/// Drives one probe run: starts both workers, consumes their events and
/// decides when the run is over.
pub struct Coordinator<C> {
    session: ProbeSession,
    channel: Option<C>,
    state: ProbeState,
    progress_tx: Option<broadcast::Sender<CorrelationEvent>>,
}

impl<C: Channel> Coordinator<C> {
    pub fn new(session: ProbeSession, channel: C) -> Coordinator<C> {
        Coordinator {
            session,
            channel: Some(channel),
            state: ProbeState::Idle,
            progress_tx: None,
        }
    }

    /// Forwards every correlation event to `progress_tx`.
    pub fn with_progress(mut self, progress_tx: broadcast::Sender<CorrelationEvent>) -> Self {
        self.progress_tx = Some(progress_tx);
        self
    }

    pub fn state(&self) -> ProbeState {
        self.state
    }

    pub fn session(&self) -> &ProbeSession {
        &self.session
    }

    /// Runs the probe to completion. A coordinator runs at most once.
    ///
    /// The run ends when every requested reply has arrived and been paired
    /// with its send event (`Done`), when the
    /// session timeout expires (`Timeout`), or when a write fails (`Error`).
    /// Partial results are reported in all three cases.
    pub async fn run(&mut self) -> Result<PingResult, ProbeError> {
        let Some(channel) = self.channel.take() else {
            return Err(ConfigError::SessionFinished.into());
        };
        let session = &self.session;
        let progress_tx = self.progress_tx.as_ref();
        let mut correlator = Correlator::new(session.count());
        let mut error: Option<ProbeError> = None;

        log::info!(
            "pinging {} with {} echo requests (id={}, {} byte payload)",
            session.remote(),
            session.count(),
            session.identifier(),
            session.payload_size()
        );
        let start_time = Instant::now();
        transition(&mut self.state, ProbeState::Running);

        let (event_tx, mut event_rx) = mpsc::channel(1);
        let status = {
            let sender = Sender::new(session);
            let receiver = Receiver::new(session);
            let channel = &channel;
            let sender_tx = event_tx.clone();
            let receiver_tx = event_tx;
            let workers = async move {
                let sending = async move { sender.run(channel, &sender_tx).await };
                let receiving = async move {
                    receiver.run(channel, &receiver_tx).await;
                    Ok::<(), ProbeError>(())
                };
                tokio::try_join!(sending, receiving).map(|_| ())
            };
            tokio::pin!(workers);
            let deadline = tokio::time::sleep(session.timeout());
            tokio::pin!(deadline);

            let mut workers_done = false;
            let mut events_closed = false;
            loop {
                // Every owed reply is in; wait only for send events still in flight.
                if self.state == ProbeState::Draining && (correlator.settled() || events_closed) {
                    break PingStatus::Done;
                }
                tokio::select! {
                    biased;
                    event = event_rx.recv(), if !events_closed => match event {
                        Some(event) => {
                            send_progress(progress_tx, &event);
                            if correlator.observe(&event) && self.state == ProbeState::Running {
                                transition(&mut self.state, ProbeState::Draining);
                            }
                        }
                        None => events_closed = true,
                    },
                    result = &mut workers, if !workers_done => {
                        workers_done = true;
                        if let Err(e) = result {
                            log::error!("probe aborted: {}", e);
                            error = Some(e);
                            break PingStatus::Error;
                        }
                    }
                    _ = &mut deadline => {
                        if self.state == ProbeState::Draining {
                            log::warn!(
                                "timeout of {:?} reached before every reply was matched to its request",
                                session.timeout()
                            );
                            break PingStatus::Done;
                        }
                        log::info!(
                            "timeout of {:?} reached with {} replies outstanding",
                            session.timeout(),
                            correlator.owed
                        );
                        break PingStatus::Timeout;
                    }
                }
            }
        };

        // Workers are gone; pick up anything they queued before stopping.
        while let Ok(event) = event_rx.try_recv() {
            send_progress(progress_tx, &event);
            correlator.observe(&event);
        }

        if self.state == ProbeState::Running {
            transition(&mut self.state, ProbeState::Draining);
        }
        drop(channel);
        let result = correlator.finish(status, start_time.elapsed(), error.map(|e| e.to_string()));
        log::info!(
            "{}: {} transmitted, {} received, {:.1}% loss",
            session.dst_ip(),
            result.statistics.transmitted,
            result.statistics.received,
            result.statistics.loss_percent
        );
        transition(&mut self.state, ProbeState::Done);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, IdentifierSource};
    use crate::ping::testing::{BrokenChannel, EchoChannel, RecordingChannel};
    use std::net::IpAddr;

    fn session(count: u16, timeout_ms: u64) -> ProbeSession {
        let mut config = Config::new("192.0.2.1");
        config.identifier = IdentifierSource::Fixed(1234);
        config.count = count;
        config.interval = Duration::from_millis(10);
        config.timeout = Duration::from_millis(timeout_ms);
        ProbeSession::from_config(&config).unwrap()
    }

    fn reply(sequence: u16, received_at: Instant) -> CorrelationEvent {
        CorrelationEvent::Receiver(Reply {
            sequence,
            received_at,
            source: IpAddr::from([192, 0, 2, 1]),
            ttl: Some(60),
            size: 64,
        })
    }

    #[test]
    fn correlator_handles_reply_before_send() {
        let t0 = Instant::now();
        let mut correlator = Correlator::new(2);
        assert!(!correlator.observe(&reply(1, t0 + Duration::from_millis(8))));
        assert_eq!(correlator.nodes[0].rtt, None);
        assert!(!correlator.settled());
        assert!(!correlator.observe(&CorrelationEvent::Sender {
            sequence: 1,
            sent_at: t0
        }));
        assert_eq!(correlator.nodes[0].rtt, Some(Duration::from_millis(8)));
        assert!(correlator.settled());
        assert_eq!(correlator.nodes[0].hop, Some(4));
    }

    #[test]
    fn correlator_counts_every_reply() {
        let t0 = Instant::now();
        let mut correlator = Correlator::new(2);
        correlator.observe(&CorrelationEvent::Sender {
            sequence: 1,
            sent_at: t0,
        });
        assert!(!correlator.observe(&reply(1, t0)));
        assert!(correlator.observe(&reply(1, t0)));
        assert!(correlator.nodes[1].duplicate);

        let result = correlator.finish(PingStatus::Done, Duration::ZERO, None);
        assert_eq!(result.statistics.transmitted, 1);
        assert_eq!(result.statistics.received, 1);
        assert_eq!(result.statistics.duplicates, 1);
    }

    #[test]
    fn sender_events_do_not_settle_the_run() {
        let mut correlator = Correlator::new(1);
        for sequence in 1..=5 {
            assert!(!correlator.observe(&CorrelationEvent::Sender {
                sequence,
                sent_at: Instant::now()
            }));
        }
        assert_eq!(correlator.owed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn echo_run_reaches_done() {
        let mut coordinator = Coordinator::new(session(3, 5000), EchoChannel::new());
        assert_eq!(coordinator.state(), ProbeState::Idle);
        let result = coordinator.run().await.unwrap();
        assert_eq!(coordinator.state(), ProbeState::Done);
        assert!(matches!(result.status, PingStatus::Done));
        assert_eq!(result.statistics.received, 3);
        assert_eq!(result.statistics.transmitted, 3);
        assert_eq!(result.statistics.loss_percent, 0.0);
        let sequences: Vec<u16> = result.results.iter().map(|n| n.seq).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert!(result.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn silent_peer_times_out() {
        let mut coordinator = Coordinator::new(session(2, 1000), RecordingChannel::default());
        let started = Instant::now();
        let result = coordinator.run().await.unwrap();
        assert!(matches!(result.status, PingStatus::Timeout));
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(result.statistics.transmitted, 2);
        assert_eq!(result.statistics.loss_percent, 100.0);
        assert_eq!(coordinator.state(), ProbeState::Done);
    }

    #[tokio::test]
    async fn write_failure_ends_with_error() {
        let mut coordinator = Coordinator::new(session(2, 5000), BrokenChannel);
        let result = coordinator.run().await.unwrap();
        assert!(matches!(result.status, PingStatus::Error));
        assert!(result.error.unwrap().contains("failed to send echo request"));
        assert_eq!(result.statistics.transmitted, 0);
        assert_eq!(coordinator.state(), ProbeState::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_only_once() {
        let mut coordinator = Coordinator::new(session(1, 5000), EchoChannel::new());
        coordinator.run().await.unwrap();
        assert!(matches!(
            coordinator.run().await,
            Err(ProbeError::Config(ConfigError::SessionFinished))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn progress_sees_both_origins() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut coordinator = Coordinator::new(session(2, 5000), EchoChannel::new()).with_progress(tx);
        coordinator.run().await.unwrap();
        let mut senders = 0;
        let mut receivers = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                CorrelationEvent::Sender { .. } => senders += 1,
                CorrelationEvent::Receiver(_) => receivers += 1,
            }
        }
        assert_eq!(senders, 2);
        assert_eq!(receivers, 2);
    }
}
