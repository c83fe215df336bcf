use std::io;
use thiserror::Error;

/// Invalid or missing session parameters. Raised before any worker starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target host is empty")]
    EmptyHost,
    #[error("target host `{0}` is not an IP address")]
    InvalidHost(String),
    #[error("timeout must be greater than zero")]
    ZeroTimeout,
    #[error("echo count must be greater than zero")]
    ZeroCount,
    #[error("payload of {size} octets exceeds the maximum of {max} octets")]
    PayloadTooLarge { size: usize, max: usize },
    #[error("address {0} does not match the selected IP version")]
    FamilyMismatch(std::net::IpAddr),
    #[error("network interface `{0}` not found")]
    UnknownInterface(String),
    #[error("probe session has already run")]
    SessionFinished,
}

/// Failure to assemble an outgoing ICMP message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("ICMP message of {len} bytes exceeds 65535 bytes")]
    TooLarge { len: usize },
}

/// Malformed inbound bytes. Always recovered by dropping the datagram.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message too short: {len} bytes")]
    TooShort { len: usize },
    #[error("echo body truncated: {len} bytes")]
    TruncatedBody { len: usize },
    #[error("IPv4 header length {header_len} is below the 20-byte minimum")]
    InvalidIhl { header_len: usize },
    #[error("IPv4 header length {header_len} exceeds datagram of {len} bytes")]
    TruncatedIpHeader { header_len: usize, len: usize },
}

/// Errors that end a probe run.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode echo request: {0}")]
    Encode(#[from] EncodeError),
}

impl ProbeError {
    pub(crate) fn transport(context: &'static str, source: io::Error) -> Self {
        ProbeError::Transport { context, source }
    }
}
