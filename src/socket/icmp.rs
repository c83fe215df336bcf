use super::{Channel, SocketFamily};
use crate::protocol::IpVersion;
use socket2::{Socket, Type};
use std::io;
use std::net::{SocketAddr, UdpSocket as StdUdpSocket};
use tokio::net::UdpSocket;

#[derive(Debug, Clone)]
pub struct IcmpConfig {
    pub family: SocketFamily,
    /// Remote host the channel is connected to.
    pub remote: SocketAddr,
    /// Local address to bind before connecting.
    pub bind: Option<SocketAddr>,
}

impl IcmpConfig {
    pub fn new(remote: SocketAddr) -> Self {
        Self {
            family: SocketFamily::from_version(IpVersion::of(&remote.ip())),
            remote,
            bind: None,
        }
    }
}

/// Raw ICMP socket connected to a single host.
///
/// Raw protocol 1 on IPv4 (reads include the IP header) and raw
/// protocol 58 on IPv6 (reads start at the ICMPv6 header).
#[derive(Debug)]
pub struct AsyncIcmpSocket {
    inner: UdpSocket,
}

impl AsyncIcmpSocket {
    pub fn new(config: &IcmpConfig) -> io::Result<Self> {
        let socket = Socket::new(
            config.family.to_domain(),
            Type::RAW,
            Some(config.family.to_protocol()),
        )?;
        socket.set_nonblocking(true)?;

        if let Some(bind) = config.bind {
            socket.bind(&bind.into())?;
        }
        socket.connect(&config.remote.into())?;

        #[cfg(windows)]
        let std_socket = unsafe {
            use std::os::windows::io::{FromRawSocket, IntoRawSocket};
            StdUdpSocket::from_raw_socket(socket.into_raw_socket())
        };
        #[cfg(unix)]
        let std_socket = unsafe {
            use std::os::fd::{FromRawFd, IntoRawFd};
            StdUdpSocket::from_raw_fd(socket.into_raw_fd())
        };

        Ok(Self {
            inner: UdpSocket::from_std(std_socket)?,
        })
    }
}

impl Channel for AsyncIcmpSocket {
    async fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.inner.send(buf).await
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.recv(buf).await
    }
}
