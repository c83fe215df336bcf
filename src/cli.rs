use check_icmp::config::{Config, IdentifierSource};
use clap::Parser;
use std::net::IpAddr;
use std::time::Duration;

/// ICMP echo check: send a few echo requests and report loss and round-trip times
#[derive(Parser, Debug, Clone)]
#[command(name = "check_icmp")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Target IP address
    #[arg(short = 'H', long = "host")]
    pub host: String,

    /// Number of echo requests to send
    #[arg(short = 'n', long = "number", default_value = "5")]
    pub number: u16,

    /// Interval between echo requests in milliseconds
    #[arg(short = 'i', long = "interval", default_value = "100")]
    pub interval: u64,

    /// Deadline for the whole run in milliseconds
    #[arg(short = 't', long = "timeout", default_value = "5000")]
    pub timeout: u64,

    /// Echo payload size in octets (+8 octets of ICMP header)
    #[arg(short = 's', long = "size", default_value = "56")]
    pub size: usize,

    /// Probe over ICMPv6
    #[arg(short = '6', long = "ipv6")]
    pub ipv6: bool,

    /// Outbound interface (name or index) for link-local IPv6 targets
    #[arg(short = 'I', long = "interface")]
    pub interface: Option<String>,

    /// Source address
    #[arg(short = 'S', long = "source")]
    pub source: Option<IpAddr>,

    /// Use a random echo identifier instead of the process id
    #[arg(long = "random-id")]
    pub random_id: bool,

    /// Log probe internals to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            host: args.host.clone(),
            count: args.number,
            interval: Duration::from_millis(args.interval),
            timeout: Duration::from_millis(args.timeout),
            payload_size: args.size,
            ipv6: args.ipv6,
            interface: args.interface.clone(),
            source: args.source,
            identifier: if args.random_id {
                IdentifierSource::Random
            } else {
                IdentifierSource::ProcessId
            },
        }
    }
}
