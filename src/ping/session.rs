use crate::config::Config;
use crate::error::ConfigError;
use crate::packet::ChecksumContext;
use crate::protocol::IpVersion;
use crate::socket::icmp::IcmpConfig;
use std::net::{IpAddr, Ipv6Addr, SocketAddr, SocketAddrV6};
use std::time::Duration;

/// Validated, immutable parameters of one probe run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeSession {
    remote: SocketAddr,
    version: IpVersion,
    source: Option<IpAddr>,
    identifier: u16,
    count: u16,
    interval: Duration,
    timeout: Duration,
    payload_size: usize,
}

impl ProbeSession {
    /// Validates `config` and resolves the identifier, IPv6 scope and source.
    pub fn from_config(config: &Config) -> Result<ProbeSession, ConfigError> {
        let host = config.host.trim();
        if host.is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        let dst_ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host.to_string()))?;
        if config.ipv6 != dst_ip.is_ipv6() {
            return Err(ConfigError::FamilyMismatch(dst_ip));
        }
        if config.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if config.count == 0 {
            return Err(ConfigError::ZeroCount);
        }
        let version = IpVersion::of(&dst_ip);
        if config.payload_size > version.max_payload() {
            return Err(ConfigError::PayloadTooLarge {
                size: config.payload_size,
                max: version.max_payload(),
            });
        }
        if let Some(source) = config.source {
            if IpVersion::of(&source) != version {
                return Err(ConfigError::FamilyMismatch(source));
            }
        }

        let (remote, source) = match dst_ip {
            IpAddr::V4(_) => {
                if let Some(name) = &config.interface {
                    log::debug!("interface {} ignored for IPv4 target", name);
                }
                (SocketAddr::new(dst_ip, 0), config.source)
            }
            IpAddr::V6(dst) => {
                let scope_id = match &config.interface {
                    Some(name) => resolve_scope_id(name)?,
                    None => 0,
                };
                let source = match config.source {
                    Some(source) => Some(source),
                    None => infer_ipv6_source(&dst, scope_id).map(IpAddr::V6),
                };
                (SocketAddr::V6(SocketAddrV6::new(dst, 0, 0, scope_id)), source)
            }
        };

        Ok(ProbeSession {
            remote,
            version,
            source,
            identifier: config.identifier.resolve(),
            count: config.count,
            interval: config.interval,
            timeout: config.timeout,
            payload_size: config.payload_size,
        })
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    pub fn dst_ip(&self) -> IpAddr {
        self.remote.ip()
    }

    pub fn version(&self) -> IpVersion {
        self.version
    }

    pub fn source(&self) -> Option<IpAddr> {
        self.source
    }

    pub fn identifier(&self) -> u16 {
        self.identifier
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn payload_size(&self) -> usize {
        self.payload_size
    }

    /// Checksum coverage for outgoing requests.
    pub fn checksum_context(&self) -> ChecksumContext {
        match self.remote.ip() {
            IpAddr::V4(_) => ChecksumContext::V4,
            IpAddr::V6(destination) => ChecksumContext::V6 {
                source: match self.source {
                    Some(IpAddr::V6(source)) => source,
                    _ => Ipv6Addr::UNSPECIFIED,
                },
                destination,
            },
        }
    }

    /// Socket parameters for the raw channel.
    pub fn icmp_config(&self) -> IcmpConfig {
        let mut config = IcmpConfig::new(self.remote);
        config.bind = self.source.map(|ip| match (ip, self.remote) {
            (IpAddr::V6(ip), SocketAddr::V6(remote)) => {
                SocketAddr::V6(SocketAddrV6::new(ip, 0, 0, remote.scope_id()))
            }
            (ip, _) => SocketAddr::new(ip, 0),
        });
        config
    }
}

fn resolve_scope_id(interface: &str) -> Result<u32, ConfigError> {
    if let Ok(index) = interface.parse::<u32>() {
        return Ok(index);
    }
    netdev::get_interfaces()
        .into_iter()
        .find(|iface| iface.name == interface)
        .map(|iface| iface.index)
        .ok_or_else(|| ConfigError::UnknownInterface(interface.to_string()))
}

fn is_unicast_link_local(addr: &Ipv6Addr) -> bool {
    (addr.segments()[0] & 0xffc0) == 0xfe80
}

/// Picks a local IPv6 address for the pseudo-header checksum.
///
/// Uses the scoped interface when one is given, otherwise the default one,
/// and prefers an address of the same scope as the destination.
fn infer_ipv6_source(dst: &Ipv6Addr, scope_id: u32) -> Option<Ipv6Addr> {
    let interface = if scope_id != 0 {
        netdev::get_interfaces()
            .into_iter()
            .find(|iface| iface.index == scope_id)
    } else {
        match netdev::get_default_interface() {
            Ok(iface) => Some(iface),
            Err(e) => {
                log::warn!("failed to get default interface: {}", e);
                None
            }
        }
    };
    let Some(interface) = interface else {
        log::warn!("no IPv6 source address found, checksum left to the kernel");
        return None;
    };
    let addrs: Vec<Ipv6Addr> = interface.ipv6.iter().map(|net| net.addr()).collect();
    let want_link_local = is_unicast_link_local(dst);
    addrs
        .iter()
        .find(|addr| is_unicast_link_local(addr) == want_link_local)
        .or_else(|| addrs.first())
        .copied()
}
