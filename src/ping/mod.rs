mod coordinator;
mod event;
mod pinger;
mod receiver;
mod sender;
mod session;
mod stats;
#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::*;
pub use event::*;
pub use pinger::*;
pub use receiver::*;
pub use sender::*;
pub use session::*;
pub use stats::*;

use crate::node::Node;
use std::time::Duration;

/// Exit status of ping
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PingStatus {
    /// Every requested reply arrived
    Done,
    /// Interrupted by a transport error
    Error,
    /// Execution time exceeds the configured timeout value
    Timeout,
}

/// Result of ping
#[derive(Clone, Debug)]
pub struct PingResult {
    /// Correlated replies in arrival order
    pub results: Vec<Node>,
    /// Ping status
    pub status: PingStatus,
    /// The entire ping probe time
    pub probe_time: Duration,
    /// Loss and latency summary
    pub statistics: PingStatistics,
    /// Transport error that ended the run early
    pub error: Option<String>,
}
