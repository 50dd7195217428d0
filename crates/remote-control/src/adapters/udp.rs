//! # UDP Transport
//!
//! `std::net::UdpSocket` behind the `DatagramTransport` port. The read
//! timeout bounds how long the loop waits before it re-checks shutdown.

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;
use tracing::debug;

use crate::domain::MAX_DATAGRAM_SIZE;
use crate::ports::{DatagramTransport, TransportError};

/// Bound UDP socket.
#[derive(Debug)]
pub struct UdpDatagramTransport {
    socket: UdpSocket,
}

impl UdpDatagramTransport {
    /// Bind to `addr` with the given read timeout.
    pub fn bind(addr: impl ToSocketAddrs, read_timeout: Duration) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr)?;
        Self::from_socket(socket, read_timeout)
    }

    /// Wrap an already bound socket.
    pub fn from_socket(socket: UdpSocket, read_timeout: Duration) -> Result<Self, TransportError> {
        // A zero timeout is rejected by the OS; it would mean "block forever".
        let timeout = (!read_timeout.is_zero()).then_some(read_timeout);
        socket.set_read_timeout(timeout)?;
        debug!(local = ?socket.local_addr().ok(), ?timeout, "udp transport ready");
        Ok(Self { socket })
    }

    /// Address the socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }
}

impl DatagramTransport for UdpDatagramTransport {
    fn recv_from(&mut self, buf: &mut [u8]) -> Result<Option<(usize, SocketAddr)>, TransportError> {
        match self.socket.recv_from(buf) {
            Ok(received) => Ok(Some(received)),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock
                        | ErrorKind::TimedOut
                        | ErrorKind::Interrupted
                        | ErrorKind::ConnectionReset
                ) =>
            {
                // ConnectionReset: ICMP port unreachable from an earlier send on Windows.
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn send_to(&mut self, payload: &[u8], peer: SocketAddr) -> Result<(), TransportError> {
        if payload.len() > MAX_DATAGRAM_SIZE {
            return Err(TransportError::MessageTooLarge(payload.len()));
        }
        let sent = self.socket.send_to(payload, peer)?;
        if sent != payload.len() {
            return Err(TransportError::ShortSend {
                sent,
                expected: payload.len(),
            });
        }
        Ok(())
    }
}
