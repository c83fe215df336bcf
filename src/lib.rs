//! ICMP echo probe: sends a bounded number of echo requests to one host and
//! correlates the replies by identifier and sequence number.
//!
//! ```no_run
//! use check_icmp::ping::Pinger;
//!
//! let pinger = Pinger::new("192.0.2.1".parse().unwrap());
//! let result = pinger.ping().unwrap();
//! println!("{:?} {:.1}% loss", result.status, result.statistics.loss_percent);
//! ```

pub mod config;
pub mod error;
pub mod node;
pub mod packet;
pub mod ping;
pub mod protocol;
pub mod socket;
