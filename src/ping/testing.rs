//! In-memory channels for exercising the workers without raw sockets.

use crate::packet::{IcmpMessage, IcmpType};
use crate::socket::Channel;
use std::collections::VecDeque;
use std::io;
use std::sync::Mutex;
use tokio::sync::{mpsc, Mutex as AsyncMutex};

/// Synthetic 20-byte IPv4 header from 192.0.2.1 with TTL 57.
pub fn ipv4_header(payload_len: usize) -> Vec<u8> {
    let total = (20 + payload_len) as u16;
    let mut header = vec![0u8; 20];
    header[0] = 0x45;
    header[2..4].copy_from_slice(&total.to_be_bytes());
    header[8] = 57;
    header[9] = 1;
    header[12..16].copy_from_slice(&[192, 0, 2, 1]);
    header[16..20].copy_from_slice(&[192, 0, 2, 100]);
    header
}

/// Rewrites the type of an encoded message in place, leaving the rest intact.
pub fn with_type(mut message: Vec<u8>, icmp_type: IcmpType) -> Vec<u8> {
    message[0] = icmp_type.0;
    message
}

/// Prefixes `message` with a synthetic IPv4 header.
pub fn in_ipv4(message: &[u8]) -> Vec<u8> {
    let mut datagram = ipv4_header(message.len());
    datagram.extend_from_slice(message);
    datagram
}

/// Records writes; reads never complete.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Mutex<Vec<Vec<u8>>>,
}

impl Channel for RecordingChannel {
    async fn send(&self, buf: &[u8]) -> io::Result<usize> {
        self.sent.lock().unwrap().push(buf.to_vec());
        Ok(buf.len())
    }

    async fn recv(&self, _buf: &mut [u8]) -> io::Result<usize> {
        std::future::pending().await
    }
}

/// Replays queued datagrams, then reports the channel as closed.
pub struct ScriptedChannel {
    inbound: Mutex<VecDeque<Vec<u8>>>,
}

impl ScriptedChannel {
    pub fn new(datagrams: Vec<Vec<u8>>) -> Self {
        Self {
            inbound: Mutex::new(datagrams.into()),
        }
    }
}

impl Channel for ScriptedChannel {
    async fn send(&self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let next = self.inbound.lock().unwrap().pop_front();
        match next {
            Some(datagram) => {
                buf[..datagram.len()].copy_from_slice(&datagram);
                Ok(datagram.len())
            }
            None => Err(io::Error::new(io::ErrorKind::ConnectionAborted, "closed")),
        }
    }
}

/// Answers every echo request like an IPv4 host would.
pub struct EchoChannel {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: AsyncMutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl EchoChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: AsyncMutex::new(rx),
        }
    }
}

impl Channel for EchoChannel {
    async fn send(&self, buf: &[u8]) -> io::Result<usize> {
        let reply = with_type(buf.to_vec(), crate::packet::IcmpTypes::EchoReply);
        let _ = self.tx.send(in_ipv4(&reply));
        Ok(buf.len())
    }

    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let datagram = self.rx.lock().await.recv().await;
        match datagram {
            Some(datagram) => {
                buf[..datagram.len()].copy_from_slice(&datagram);
                Ok(datagram.len())
            }
            None => Err(io::Error::new(io::ErrorKind::ConnectionAborted, "closed")),
        }
    }
}

/// Fails every write.
pub struct BrokenChannel;

impl Channel for BrokenChannel {
    async fn send(&self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "operation not permitted"))
    }

    async fn recv(&self, _buf: &mut [u8]) -> io::Result<usize> {
        std::future::pending().await
    }
}

pub fn decode(bytes: &[u8]) -> IcmpMessage {
    IcmpMessage::decode(bytes).unwrap()
}
