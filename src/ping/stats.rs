use crate::node::Node;
use std::time::Duration;

/// Loss and latency summary of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct PingStatistics {
    /// Echo requests written
    pub transmitted: u16,
    /// Distinct sequences answered
    pub received: u16,
    /// Replies for already-answered sequences
    pub duplicates: u16,
    pub loss_percent: f64,
    pub min_rtt: Option<Duration>,
    pub avg_rtt: Option<Duration>,
    pub max_rtt: Option<Duration>,
}

impl PingStatistics {
    pub fn new(transmitted: u16, nodes: &[Node]) -> PingStatistics {
        let (unique, duplicates): (Vec<&Node>, Vec<&Node>) =
            nodes.iter().partition(|node| !node.duplicate);
        let received = unique.len().min(usize::from(u16::MAX)) as u16;
        let rtts: Vec<Duration> = unique.iter().filter_map(|node| node.rtt).collect();
        let avg_rtt = if rtts.is_empty() {
            None
        } else {
            Some(rtts.iter().sum::<Duration>() / rtts.len() as u32)
        };
        PingStatistics {
            transmitted,
            received,
            duplicates: duplicates.len() as u16,
            loss_percent: loss_percent(transmitted, received),
            min_rtt: rtts.iter().min().copied(),
            avg_rtt,
            max_rtt: rtts.iter().max().copied(),
        }
    }
}

fn loss_percent(transmitted: u16, received: u16) -> f64 {
    if transmitted == 0 {
        return 0.0;
    }
    let lost = transmitted.saturating_sub(received);
    f64::from(lost) * 100.0 / f64::from(transmitted)
}
